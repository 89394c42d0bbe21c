use crate::models::record::{
    interests_to_string, normalize_active, parse_interests, UserRecord,
};
use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Operations recorded in the presence journal
#[derive(Debug, Clone, PartialEq)]
pub enum JournalOperation {
    Upsert { record: UserRecord },
    Logout { student_id: String },
    Link { student_id: String, peer_id: String },
}

impl JournalOperation {
    fn to_line(&self) -> String {
        match self {
            JournalOperation::Upsert { record } => {
                let active = if record.active { "TRUE" } else { "FALSE" };
                let last_seen = record
                    .last_seen
                    .map(|ts| ts.to_string())
                    .unwrap_or_default();
                format!(
                    "UPSERT|{}|{}|{}|{}|{}",
                    record.student_id,
                    record.display_name,
                    active,
                    interests_to_string(&record.interests),
                    last_seen
                )
            }
            JournalOperation::Logout { student_id } => {
                format!("LOGOUT|{}", student_id)
            }
            JournalOperation::Link {
                student_id,
                peer_id,
            } => {
                format!("LINK|{}|{}", student_id, peer_id)
            }
        }
    }

    fn from_line(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split('|').collect();

        match parts.first() {
            Some(&"UPSERT") => {
                if parts.len() != 6 {
                    bail!("Invalid UPSERT format");
                }
                let student_id = parts[1].trim();
                if student_id.is_empty() {
                    bail!("UPSERT with empty student_id");
                }
                let last_seen = if parts[5].is_empty() {
                    None
                } else {
                    Some(parts[5].parse::<i64>().context("Invalid last_seen")?)
                };

                Ok(JournalOperation::Upsert {
                    record: UserRecord::new(
                        student_id.to_string(),
                        parts[2].trim().to_string(),
                        parse_interests(parts[4]),
                        normalize_active(parts[3]),
                        last_seen,
                    ),
                })
            }
            Some(&"LOGOUT") => {
                if parts.len() != 2 {
                    bail!("Invalid LOGOUT format");
                }
                Ok(JournalOperation::Logout {
                    student_id: parts[1].to_string(),
                })
            }
            Some(&"LINK") => {
                if parts.len() != 3 {
                    bail!("Invalid LINK format");
                }
                Ok(JournalOperation::Link {
                    student_id: parts[1].to_string(),
                    peer_id: parts[2].to_string(),
                })
            }
            _ => bail!("Unknown operation type"),
        }
    }
}

/// Append-only presence journal.
///
/// Each row-level write is one delimited line; the file is replayed at
/// startup to rebuild the in-memory table. Heartbeats are not journaled,
/// so replayed rows re-enter stale and stay hidden from matching until
/// their next heartbeat.
pub struct Journal {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl Journal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open journal file")?;

        Ok(Journal {
            file: Arc::new(Mutex::new(file)),
            path,
        })
    }

    pub fn log_operation(&self, op: JournalOperation) -> Result<()> {
        let line = op.to_line();
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", line).context("Failed to write to journal")?;
        file.flush().context("Failed to flush journal")?;
        Ok(())
    }

    /// Read back every operation in the journal.
    /// Malformed lines are logged and skipped, never fatal.
    pub fn replay(&self) -> Result<Vec<JournalOperation>> {
        let file = File::open(&self.path).context("Failed to open journal for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from journal")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match JournalOperation::from_line(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse journal line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }
}
