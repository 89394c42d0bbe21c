use crate::matching::vocabulary::Vocabulary;
use crate::models::record::UserRecord;
use crate::utils::time::is_stale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A live peer with its similarity score against the requester
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedPeer {
    pub student_id: String,
    pub display_name: String,
    pub interests: BTreeSet<String>,
    /// round(jaccard * 100), bounded [0, 100]
    pub match_score: u8,
}

/// Liveness filter: discoverable flag plus a fresh heartbeat
pub fn is_live(record: &UserRecord, window: i64, now: i64) -> bool {
    record.active && !is_stale(record.last_seen, window, now)
}

/// Jaccard similarity over tag sets: |intersection| / |union|.
/// An empty union scores 0, so a requester with no declared interests
/// scores 0 against everyone rather than erroring.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

fn match_score(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Rank the live peers in a snapshot by interest similarity to the requester.
///
/// Pure function over the snapshot: filters to live rows, excludes the
/// requester's own row, scores each peer by Jaccard similarity over
/// vocabulary-projected tag sets, sorts descending by similarity with a
/// stable ascending-id tie-break, and truncates to `limit`.
///
/// A requester whose row is absent from the snapshot is ranked with an empty
/// interest set. A snapshot with fewer than two live rows yields an empty
/// list; that is the normal "no matches yet" state, not an error.
pub fn rank_peers(
    requester_id: &str,
    snapshot: &[UserRecord],
    vocabulary: &Vocabulary,
    window: i64,
    now: i64,
    limit: usize,
) -> Vec<RankedPeer> {
    let live: Vec<&UserRecord> = snapshot
        .iter()
        .filter(|record| is_live(record, window, now))
        .collect();

    if live.len() < 2 {
        return Vec::new();
    }

    let requester_set = snapshot
        .iter()
        .find(|record| record.student_id == requester_id)
        .map(|record| vocabulary.project(&record.interests))
        .unwrap_or_default();

    let mut scored: Vec<(f64, &UserRecord)> = live
        .into_iter()
        .filter(|record| record.student_id != requester_id)
        .map(|record| {
            let peer_set = vocabulary.project(&record.interests);
            (jaccard(&requester_set, &peer_set), record)
        })
        .collect();

    scored.sort_by(|(sim_a, rec_a), (sim_b, rec_b)| {
        sim_b
            .partial_cmp(sim_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| rec_a.student_id.cmp(&rec_b.student_id))
    });

    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(similarity, record)| RankedPeer {
            student_id: record.student_id.clone(),
            display_name: record.display_name.clone(),
            interests: record.interests.clone(),
            match_score: match_score(similarity),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::parse_interests;

    const NOW: i64 = 100_000;
    const WINDOW: i64 = 60;

    fn record(id: &str, interests: &str, active: bool) -> UserRecord {
        UserRecord::new(
            id.to_string(),
            format!("Student {}", id),
            parse_interests(interests),
            active,
            Some(NOW - 5),
        )
    }

    fn rank(requester: &str, snapshot: &[UserRecord]) -> Vec<RankedPeer> {
        rank_peers(requester, snapshot, &Vocabulary::open(), WINDOW, NOW, 10)
    }

    #[test]
    fn test_jaccard_symmetric() {
        let a = parse_interests("python,ml");
        let b = parse_interests("ml,dsa,design");

        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn test_jaccard_bounds() {
        let a = parse_interests("python,ml");
        let b = parse_interests("ml,dsa");
        let sim = jaccard(&a, &b);

        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn test_jaccard_empty_sets() {
        let empty = BTreeSet::new();
        let tags = parse_interests("python");

        assert_eq!(jaccard(&empty, &tags), 0.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn test_identical_interests_score_100() {
        let snapshot = vec![record("A", "python,ml", true), record("B", "ml,python", true)];
        let peers = rank("A", &snapshot);

        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].match_score, 100);
    }

    #[test]
    fn test_disjoint_interests_score_0() {
        let snapshot = vec![record("A", "python,ml", true), record("B", "design,art", true)];
        let peers = rank("A", &snapshot);

        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].match_score, 0);
    }

    #[test]
    fn test_requester_never_in_own_list() {
        let snapshot = vec![
            record("A", "python", true),
            record("B", "python", true),
            record("C", "python", true),
        ];
        let peers = rank("A", &snapshot);

        assert_eq!(peers.len(), 2);
        assert!(!peers.iter().any(|p| p.student_id == "A"));
    }

    #[test]
    fn test_fewer_than_two_live_records_yields_empty() {
        assert!(rank("A", &[]).is_empty());
        assert!(rank("A", &[record("A", "python", true)]).is_empty());
        assert!(rank("A", &[record("B", "python", true)]).is_empty());
    }

    #[test]
    fn test_inactive_rows_excluded() {
        let snapshot = vec![
            record("A", "python,ml", true),
            record("B", "ml,dsa", true),
            record("C", "design", false),
        ];
        let peers = rank("A", &snapshot);

        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].student_id, "B");
        // |{ml}| / |{python, ml, dsa}| = 1/3
        assert_eq!(peers[0].match_score, 33);
    }

    #[test]
    fn test_stale_heartbeat_excluded_despite_active_flag() {
        let mut stale = record("B", "python", true);
        stale.last_seen = Some(NOW - WINDOW - 1);

        let snapshot = vec![record("A", "python", true), stale, record("C", "python", true)];
        let peers = rank("A", &snapshot);

        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].student_id, "C");
    }

    #[test]
    fn test_missing_heartbeat_excluded() {
        let mut zombie = record("B", "python", true);
        zombie.last_seen = None;

        let snapshot = vec![record("A", "python", true), zombie, record("C", "python", true)];
        let peers = rank("A", &snapshot);

        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].student_id, "C");
    }

    #[test]
    fn test_requester_absent_scores_everyone_zero() {
        let snapshot = vec![record("B", "python,ml", true), record("C", "dsa", true)];
        let peers = rank("ghost", &snapshot);

        assert_eq!(peers.len(), 2);
        assert!(peers.iter().all(|p| p.match_score == 0));
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let snapshot = vec![
            record("A", "python", true),
            record("D", "python", true),
            record("B", "python", true),
            record("C", "dsa", true),
        ];
        let peers = rank("A", &snapshot);

        assert_eq!(peers.len(), 3);
        assert_eq!(peers[0].student_id, "B");
        assert_eq!(peers[1].student_id, "D");
        assert_eq!(peers[2].student_id, "C");
    }

    #[test]
    fn test_limit_truncates() {
        let snapshot = vec![
            record("A", "python", true),
            record("B", "python", true),
            record("C", "python", true),
            record("D", "python", true),
        ];
        let peers = rank_peers("A", &snapshot, &Vocabulary::open(), WINDOW, NOW, 2);

        assert_eq!(peers.len(), 2);
    }

    #[test]
    fn test_closed_vocabulary_ignores_unrecognized_tags() {
        let vocab = Vocabulary::closed(["python", "ml", "dsa"]);
        let snapshot = vec![
            record("A", "python,knitting", true),
            record("B", "python,origami", true),
        ];
        let peers = rank_peers("A", &snapshot, &vocab, WINDOW, NOW, 10);

        // Both project to {python}: identical sets inside the vocabulary
        assert_eq!(peers[0].match_score, 100);
    }
}
