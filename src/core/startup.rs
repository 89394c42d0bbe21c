use anyhow::Result;
use tracing::debug;

use crate::core::state::AppState;
use crate::journal::journal::JournalOperation;

// this runs at boot time
pub fn apply_journal_operations(state: &AppState, operations: &[JournalOperation]) -> Result<()> {
    for op in operations {
        match op {
            JournalOperation::Upsert { record } => {
                state.presence.upsert(record.clone());
            }
            JournalOperation::Logout { student_id } => {
                if !state.presence.set_active(student_id, false) {
                    debug!(student_id = %student_id, "LOGOUT for unknown row, ignoring");
                }
            }
            JournalOperation::Link {
                student_id,
                peer_id,
            } => {
                if !state.presence.set_linked_with(student_id, peer_id) {
                    debug!(student_id = %student_id, "LINK for unknown row, ignoring");
                }
            }
        }
    }
    Ok(())
}
