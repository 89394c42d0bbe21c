use crate::models::record::normalize_tags;
use std::collections::BTreeSet;

/// Interest vocabulary used for vectorization.
///
/// A closed vocabulary enumerates the recognized tags in configuration and
/// ignores everything else, so vectorization is deterministic regardless of
/// what strings happen to appear in a snapshot. An empty tag list selects
/// the open variant, where raw normalized tag sets are compared directly.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    tags: Vec<String>,
}

impl Vocabulary {
    pub fn closed<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: BTreeSet<String> = normalize_tags(tags);
        Self {
            tags: normalized.into_iter().collect(),
        }
    }

    pub fn open() -> Self {
        Self { tags: Vec::new() }
    }

    pub fn is_open(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Restrict a tag set to the recognized vocabulary.
    /// Open vocabulary passes the set through unchanged.
    pub fn project(&self, interests: &BTreeSet<String>) -> BTreeSet<String> {
        if self.is_open() {
            return interests.clone();
        }

        interests
            .iter()
            .filter(|tag| self.tags.binary_search(tag).is_ok())
            .cloned()
            .collect()
    }

    /// Fixed-length binary vector over the vocabulary, one position per tag.
    /// Empty for the open variant, which has no fixed tag space.
    pub fn multi_hot(&self, interests: &BTreeSet<String>) -> Vec<u8> {
        self.tags
            .iter()
            .map(|tag| u8::from(interests.contains(tag)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::parse_interests;

    #[test]
    fn test_closed_vocabulary_normalizes_and_dedupes() {
        let vocab = Vocabulary::closed(["Python", " ML ", "python", "DSA"]);
        assert_eq!(vocab.tags(), &["dsa", "ml", "python"]);
        assert!(!vocab.is_open());
    }

    #[test]
    fn test_project_drops_unrecognized_tags() {
        let vocab = Vocabulary::closed(["python", "ml", "dsa"]);
        let projected = vocab.project(&parse_interests("python,knitting"));

        assert_eq!(projected.len(), 1);
        assert!(projected.contains("python"));
    }

    #[test]
    fn test_open_vocabulary_passes_through() {
        let vocab = Vocabulary::open();
        let interests = parse_interests("python,knitting");

        assert_eq!(vocab.project(&interests), interests);
    }

    #[test]
    fn test_multi_hot_positions_follow_vocabulary_order() {
        let vocab = Vocabulary::closed(["python", "ml", "dsa"]);
        // Sorted vocabulary order: dsa, ml, python
        let vector = vocab.multi_hot(&parse_interests("python,dsa"));
        assert_eq!(vector, vec![1, 0, 1]);
    }

    #[test]
    fn test_multi_hot_empty_set() {
        let vocab = Vocabulary::closed(["python", "ml"]);
        assert_eq!(vocab.multi_hot(&BTreeSet::new()), vec![0, 0]);
    }
}
