use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the presence table: a student's self-asserted availability
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Stable unique identifier (student id / roll number)
    pub student_id: String,
    /// Display name, last-write-wins
    pub display_name: String,
    /// Normalized interest tags
    pub interests: BTreeSet<String>,
    /// Whether the student is currently discoverable
    pub active: bool,
    /// Unix timestamp of the last join/heartbeat; None only for rows
    /// replayed from a journal written before the field existed
    pub last_seen: Option<i64>,
    /// Last link target, best-effort signal for the peer to discover
    pub linked_with: Option<String>,
}

impl UserRecord {
    pub fn new(
        student_id: String,
        display_name: String,
        interests: BTreeSet<String>,
        active: bool,
        last_seen: Option<i64>,
    ) -> Self {
        Self {
            student_id,
            display_name,
            interests,
            active,
            last_seen,
            linked_with: None,
        }
    }
}

/// Normalize the `is_active` encodings the source data uses interchangeably.
/// Anything unrecognized counts as inactive.
pub fn normalize_active(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_uppercase().as_str(),
        "TRUE" | "1" | "YES"
    )
}

/// Parse a comma-delimited interest string into a normalized tag set.
/// Tags are trimmed and lowercased; empty tags are discarded.
pub fn parse_interests(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Normalize a list of free-text tags the same way `parse_interests` does,
/// additionally stripping the journal delimiters out of each tag.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| {
            tag.as_ref()
                .replace(['|', ','], " ")
                .trim()
                .to_lowercase()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Serialize a tag set back to the comma-delimited journal encoding
pub fn interests_to_string(interests: &BTreeSet<String>) -> String {
    interests
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
