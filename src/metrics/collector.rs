use crate::stores::presence::PresenceStore;
use crate::utils::time::current_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub total_joins: AtomicU64,
    pub total_heartbeats: AtomicU64,
    pub total_peer_queries: AtomicU64,
    pub total_links: AtomicU64,
    pub total_logouts: AtomicU64,
    pub failed_requests: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_joins: u64,
    pub total_heartbeats: u64,
    pub total_peer_queries: u64,
    pub total_links: u64,
    pub total_logouts: u64,
    pub failed_requests: u64,
    /// Rows in the presence table, live or not
    pub total_students: usize,
    /// Rows that would pass the liveness filter right now
    pub live_students: usize,
    pub uptime_seconds: i64,
    pub requests_per_second: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_joins: AtomicU64::new(0),
            total_heartbeats: AtomicU64::new(0),
            total_peer_queries: AtomicU64::new(0),
            total_links: AtomicU64::new(0),
            total_logouts: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_joins(&self) {
        self.total_joins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_heartbeats(&self) {
        self.total_heartbeats.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_peer_queries(&self) {
        self.total_peer_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_links(&self) {
        self.total_links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_logouts(&self) {
        self.total_logouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Collect counters and derive uptime and request-rate figures
    pub fn get_snapshot(&self, store: &PresenceStore, freshness_window: i64) -> MetricsSnapshot {
        let now = current_timestamp();

        let total_joins = self.total_joins.load(Ordering::Relaxed);
        let total_heartbeats = self.total_heartbeats.load(Ordering::Relaxed);
        let total_peer_queries = self.total_peer_queries.load(Ordering::Relaxed);
        let total_links = self.total_links.load(Ordering::Relaxed);
        let total_logouts = self.total_logouts.load(Ordering::Relaxed);

        let total_requests =
            total_joins + total_heartbeats + total_peer_queries + total_links + total_logouts;

        let uptime_seconds = now - self.start_time;

        let requests_per_second = if uptime_seconds > 0 {
            total_requests as f64 / uptime_seconds as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            total_joins,
            total_heartbeats,
            total_peer_queries,
            total_links,
            total_logouts,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            total_students: store.len(),
            live_students: store.live_count(freshness_window, now),
            uptime_seconds,
            requests_per_second,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{parse_interests, UserRecord};

    #[test]
    fn test_new_metrics() {
        let metrics = Metrics::new();

        assert_eq!(metrics.total_joins.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.failed_requests.load(Ordering::Relaxed), 0);
        assert!(metrics.start_time > 0);
    }

    #[test]
    fn test_increment_counters() {
        let metrics = Metrics::new();

        metrics.increment_joins();
        metrics.increment_joins();
        metrics.increment_heartbeats();
        metrics.increment_peer_queries();
        metrics.increment_links();
        metrics.increment_logouts();
        metrics.increment_failed();

        assert_eq!(metrics.total_joins.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.total_heartbeats.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.total_peer_queries.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.total_links.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.total_logouts.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.failed_requests.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_get_snapshot_empty() {
        let metrics = Metrics::new();
        let store = PresenceStore::new();

        let snapshot = metrics.get_snapshot(&store, 60);

        assert_eq!(snapshot.total_joins, 0);
        assert_eq!(snapshot.total_students, 0);
        assert_eq!(snapshot.live_students, 0);
        assert!(snapshot.uptime_seconds >= 0);
        assert_eq!(snapshot.requests_per_second, 0.0);
    }

    #[test]
    fn test_get_snapshot_counts_live_and_total() {
        let metrics = Metrics::new();
        let store = PresenceStore::new();
        let now = current_timestamp();

        store.upsert(UserRecord::new(
            "A".to_string(),
            "Ada".to_string(),
            parse_interests("python"),
            true,
            Some(now),
        ));
        store.upsert(UserRecord::new(
            "B".to_string(),
            "Bert".to_string(),
            parse_interests("ml"),
            false,
            Some(now),
        ));

        metrics.increment_joins();
        metrics.increment_joins();

        let snapshot = metrics.get_snapshot(&store, 60);

        assert_eq!(snapshot.total_joins, 2);
        assert_eq!(snapshot.total_students, 2);
        assert_eq!(snapshot.live_students, 1);
    }
}
