use crate::models::record::UserRecord;
use crate::utils::time::is_stale;
use dashmap::DashMap;

/// In-memory presence table keyed by student id.
///
/// Upserts are atomic per key, so concurrent writers can never drop one
/// another's rows the way a read-modify-write of a whole table could.
pub struct PresenceStore {
    records: DashMap<String, UserRecord>,
}

impl PresenceStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
        }
    }

    /// Replace the row for `record.student_id`, or insert it if absent.
    /// The whole row is replaced; no history is kept.
    pub fn upsert(&self, record: UserRecord) {
        self.records.insert(record.student_id.clone(), record);
    }

    pub fn get(&self, student_id: &str) -> Option<UserRecord> {
        self.records
            .get(student_id)
            .map(|entry| entry.value().clone())
    }

    /// Refresh the heartbeat on an existing row.
    /// Returns false if the student never joined.
    pub fn touch(&self, student_id: &str, now: i64) -> bool {
        match self.records.get_mut(student_id) {
            Some(mut entry) => {
                entry.last_seen = Some(now);
                entry.active = true;
                true
            }
            None => false,
        }
    }

    /// Flip the discoverable flag on an existing row.
    /// Returns false if the student never joined.
    pub fn set_active(&self, student_id: &str, active: bool) -> bool {
        match self.records.get_mut(student_id) {
            Some(mut entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// Record a link target on the requester's own row.
    /// Returns false if the requester never joined.
    pub fn set_linked_with(&self, student_id: &str, peer_id: &str) -> bool {
        match self.records.get_mut(student_id) {
            Some(mut entry) => {
                entry.linked_with = Some(peer_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Snapshot of the whole table. No consistency guarantee across calls.
    pub fn snapshot(&self) -> Vec<UserRecord> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Demote rows whose heartbeat aged out of the freshness window.
    /// Rows are flipped to inactive, never deleted.
    pub fn deactivate_stale(&self, window: i64, now: i64) -> usize {
        let mut demoted = 0;

        for mut entry in self.records.iter_mut() {
            if entry.active && is_stale(entry.last_seen, window, now) {
                entry.active = false;
                demoted += 1;
            }
        }

        demoted
    }

    /// Rows that are both flagged active and inside the freshness window
    pub fn live_count(&self, window: i64, now: i64) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.active && !is_stale(entry.last_seen, window, now))
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for PresenceStore {
    fn default() -> Self {
        Self::new()
    }
}
