use crate::models::record::normalize_tags;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;

const MAX_ID_LEN: usize = 64;
const MAX_NAME_LEN: usize = 64;
const MAX_INTERESTS: usize = 32;

/// Request body for join requests
#[derive(Debug, Deserialize)]
pub struct JoinParams {
    /// Student id / roll number, e.g. "2024IIITK01"
    pub student_id: String,

    /// Nickname shown to peers
    pub display_name: String,

    /// Free-text interest tags, normalized during validation
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug)]
pub struct ValidatedJoinParams {
    pub student_id: String,
    pub display_name: String,
    pub interests: BTreeSet<String>,
}

impl JoinParams {
    pub fn validate(self) -> Result<ValidatedJoinParams> {
        let student_id = validate_student_id(&self.student_id).context("Invalid student_id")?;

        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            bail!("display_name must not be empty");
        }
        if display_name.len() > MAX_NAME_LEN {
            bail!("display_name must be at most {} characters", MAX_NAME_LEN);
        }
        if display_name.contains('|') {
            bail!("display_name must not contain '|'");
        }

        if self.interests.len() > MAX_INTERESTS {
            bail!("At most {} interests are accepted", MAX_INTERESTS);
        }

        Ok(ValidatedJoinParams {
            student_id,
            display_name: display_name.to_string(),
            interests: normalize_tags(&self.interests),
        })
    }
}

/// Trim and bound a student id; the journal field separator is rejected
/// so a row can never corrupt the journal encoding.
pub fn validate_student_id(raw: &str) -> Result<String> {
    let id = raw.trim();

    if id.is_empty() {
        bail!("student_id must not be empty");
    }
    if id.len() > MAX_ID_LEN {
        bail!("student_id must be at most {} characters", MAX_ID_LEN);
    }
    if id.contains('|') {
        bail!("student_id must not contain '|'");
    }

    Ok(id.to_string())
}
