use std::time::{SystemTime, UNIX_EPOCH};

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs() as i64
}

/// A heartbeat is stale once it is at least `window` seconds old.
/// A record that never recorded a heartbeat is always stale.
pub fn is_stale(last_seen: Option<i64>, window: i64, now: i64) -> bool {
    match last_seen {
        Some(ts) => now - ts >= window,
        None => true,
    }
}
