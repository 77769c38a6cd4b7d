//! Merging of local and remote search results.

use std::collections::HashMap;

use crate::model::{ShowId, ShowSummary};

/// Merge local and remote results by show id.
///
/// Local results are taken first. A remote result replaces the local entry
/// for the same id only when its `updated` revision is strictly greater;
/// the replacement keeps the local entry's position and watchlist flag.
/// The merged list is sorted by score descending, ties keeping insertion
/// order.
pub fn merge_results(local: Vec<ShowSummary>, remote: Vec<ShowSummary>) -> Vec<ShowSummary> {
    let mut merged: Vec<ShowSummary> = Vec::with_capacity(local.len() + remote.len());
    let mut index: HashMap<ShowId, usize> = HashMap::new();

    for show in local.into_iter().chain(remote) {
        match index.get(&show.id) {
            Some(&i) => {
                let existing = &mut merged[i];
                if show.updated > existing.updated {
                    let in_watchlist = existing.is_in_watchlist || show.is_in_watchlist;
                    *existing = show.with_watchlist(in_watchlist);
                }
            }
            None => {
                index.insert(show.id, merged.len());
                merged.push(show);
            }
        }
    }

    // sort_by is stable
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn show(id: u32, name: &str, updated: i64, score: f32) -> ShowSummary {
        let mut show = fixtures::show(id, name).with_score(score);
        show.updated = updated;
        show
    }

    #[test]
    fn test_newer_remote_wins() {
        let local = vec![show(1, "Local copy", 100, 80.0)];
        let remote = vec![show(1, "Remote copy", 200, 75.0)];

        let merged = merge_results(local, remote.clone());

        assert_eq!(merged, remote);
    }

    #[test]
    fn test_newer_local_wins() {
        let local = vec![show(1, "Local copy", 200, 80.0)];
        let remote = vec![show(1, "Remote copy", 100, 75.0)];

        let merged = merge_results(local.clone(), remote);

        assert_eq!(merged, local);
    }

    #[test]
    fn test_equal_revision_keeps_local() {
        let merged = merge_results(
            vec![show(1, "Local copy", 100, 80.0)],
            vec![show(1, "Remote copy", 100, 75.0)],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Local copy");
    }

    #[test]
    fn test_replacement_keeps_watchlist_flag() {
        let local = vec![show(1, "Local copy", 100, 80.0).with_watchlist(true)];
        let remote = vec![show(1, "Remote copy", 200, 75.0)];

        let merged = merge_results(local, remote);

        assert_eq!(merged[0].name, "Remote copy");
        assert!(merged[0].is_in_watchlist);
    }

    #[test]
    fn test_sorted_by_score_descending() {
        let local = vec![show(1, "A", 1, 50.0), show(2, "B", 1, 100.0)];
        let remote = vec![show(3, "C", 1, 75.0)];

        let ids: Vec<u32> = merge_results(local, remote).iter().map(|s| s.id).collect();

        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let local = vec![show(4, "D", 1, 80.0), show(2, "B", 1, 80.0)];
        let remote = vec![show(9, "Z", 1, 80.0), show(1, "A", 1, 80.0), show(5, "E", 1, 90.0)];

        let ids: Vec<u32> = merge_results(local, remote).iter().map(|s| s.id).collect();

        assert_eq!(ids, vec![5, 4, 2, 9, 1]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_results(Vec::new(), Vec::new()).is_empty());
    }
}
