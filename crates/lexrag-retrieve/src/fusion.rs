//! Reciprocal Rank Fusion over per-path rank lists, and the cross-list /
//! cross-collection tie-breaking rule.
//!
//! Grounded on `ploke-rag::fusion::rrf_fuse` for the general shape (weighted
//! sum of `1/(K + rank)` over whichever lists a document appears in), but
//! the tie-break comparator here follows its own rule — "more lists, then
//! lower dense rank, then lexicographic key" — rather than `ploke-rag`'s
//! stable-UUID tie-break, since row identity here is a `(collection_key,
//! name)` pair, not a UUID.

pub const RRF_K: f32 = 60.0;

/// One candidate's fusion bookkeeping within a single collection: how many
/// per-path lists it appeared in, its RRF score, and its dense-path rank
/// (if any) for tie-breaking.
#[derive(Debug, Clone, Copy)]
pub struct FusionEntry {
    pub row_idx: usize,
    pub rrf_score: f32,
    pub lists_appeared_in: u8,
    pub dense_rank: Option<usize>,
}

/// Fuse a dense rank list and a sparse rank list (each already sorted
/// best-first, 0-based row indices) into per-row RRF scores.
///
/// `dense` and `sparse` are `(row_idx, _score)` pairs; only order matters
/// for RRF — the per-path scores themselves are not comparable and are not
/// used here.
pub fn rrf_fuse(dense: &[(usize, f32)], sparse: &[(usize, f32)]) -> Vec<FusionEntry> {
    use std::collections::HashMap;

    let mut entries: HashMap<usize, FusionEntry> = HashMap::new();

    for (rank0, (row_idx, _)) in dense.iter().enumerate() {
        let rank = rank0 + 1;
        let e = entries.entry(*row_idx).or_insert(FusionEntry {
            row_idx: *row_idx,
            rrf_score: 0.0,
            lists_appeared_in: 0,
            dense_rank: None,
        });
        e.rrf_score += 1.0 / (RRF_K + rank as f32);
        e.lists_appeared_in += 1;
        e.dense_rank = Some(rank);
    }

    for (rank0, (row_idx, _)) in sparse.iter().enumerate() {
        let rank = rank0 + 1;
        let e = entries.entry(*row_idx).or_insert(FusionEntry {
            row_idx: *row_idx,
            rrf_score: 0.0,
            lists_appeared_in: 0,
            dense_rank: None,
        });
        e.rrf_score += 1.0 / (RRF_K + rank as f32);
        e.lists_appeared_in += 1;
    }

    let mut out: Vec<FusionEntry> = entries.into_values().collect();
    sort_by_tiebreak(&mut out, |e| e.rrf_score, |e| e.lists_appeared_in, |e| e.dense_rank, |e| e.row_idx);
    out
}

/// Sort `items` descending by score, then descending by list count, then
/// ascending by dense rank (`None` sorts last), then ascending by a final
/// key used only to make ordering total and deterministic (row index here;
/// callers merging across collections use the `(collection_key, name)`
/// pair instead via [`rank_key`]).
fn sort_by_tiebreak<T>(
    items: &mut [T],
    score: impl Fn(&T) -> f32,
    lists: impl Fn(&T) -> u8,
    dense_rank: impl Fn(&T) -> Option<usize>,
    final_key: impl Fn(&T) -> usize,
) {
    items.sort_by(|a, b| {
        score(b)
            .total_cmp(&score(a))
            .then_with(|| lists(b).cmp(&lists(a)))
            .then_with(|| dense_rank(a).unwrap_or(usize::MAX).cmp(&dense_rank(b).unwrap_or(usize::MAX)))
            .then_with(|| final_key(a).cmp(&final_key(b)))
    });
}

/// Min-max normalize a set of `(row_idx, score)` pairs to `[0, 1]`,
/// preserving order. Used on the sparse path's positive-scored top-k before
/// fusion: normalize those scores within the returned set.
pub fn min_max_normalize(scores: &[(usize, f32)]) -> Vec<(usize, f32)> {
    if scores.is_empty() {
        return Vec::new();
    }
    let min = scores.iter().map(|(_, s)| *s).fold(f32::INFINITY, f32::min);
    let max = scores.iter().map(|(_, s)| *s).fold(f32::NEG_INFINITY, f32::max);
    let denom = (max - min).max(1e-6);
    scores.iter().map(|(i, s)| (*i, (*s - min) / denom)).collect()
}

/// The full tie-break key used once documents are merged across
/// collections: `(collection_key, name)` replaces the row-index final key
/// used within a single collection.
pub fn cmp_cross_collection(
    a_score: f32,
    a_lists: u8,
    a_dense_rank: Option<usize>,
    a_key: (&str, &str),
    b_score: f32,
    b_lists: u8,
    b_dense_rank: Option<usize>,
    b_key: (&str, &str),
) -> std::cmp::Ordering {
    b_score
        .total_cmp(&a_score)
        .then_with(|| b_lists.cmp(&a_lists))
        .then_with(|| a_dense_rank.unwrap_or(usize::MAX).cmp(&b_dense_rank.unwrap_or(usize::MAX)))
        .then_with(|| a_key.cmp(&b_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_top_rank_in_both_paths_scores_two_over_sixty_one() {
        let dense = [(0usize, 0.9f32)];
        let sparse = [(0usize, 5.0f32)];
        let fused = rrf_fuse(&dense, &sparse);
        assert_eq!(fused.len(), 1);
        assert!((fused[0].rrf_score - (1.0 / 61.0 + 1.0 / 61.0)).abs() < 1e-6);
        assert_eq!(fused[0].lists_appeared_in, 2);
    }

    #[test]
    fn document_only_in_one_path_gets_single_contribution() {
        let dense = [(0usize, 0.9f32), (1usize, 0.5f32)];
        let sparse: [(usize, f32); 0] = [];
        let fused = rrf_fuse(&dense, &sparse);
        let doc0 = fused.iter().find(|e| e.row_idx == 0).unwrap();
        assert!((doc0.rrf_score - 1.0 / 61.0).abs() < 1e-6);
        assert_eq!(doc0.lists_appeared_in, 1);
    }

    #[test]
    fn ties_prefer_more_lists_then_lower_dense_rank() {
        // Two docs with identical rrf_score by construction: one from two
        // lists at low individual ranks, one boosted artificially equal via
        // direct construction (bypassing rrf_fuse) to exercise the
        // tie-break comparator itself.
        let ordering = cmp_cross_collection(
            0.5, 2, Some(3), ("acts", "a"),
            0.5, 1, Some(1), ("bills", "z"),
        );
        assert_eq!(ordering, std::cmp::Ordering::Less); // more lists wins regardless of dense rank
    }

    #[test]
    fn min_max_normalize_scales_into_unit_range() {
        let normalized = min_max_normalize(&[(0, 2.0), (1, 4.0), (2, 6.0)]);
        assert!((normalized[0].1 - 0.0).abs() < 1e-6);
        assert!((normalized[2].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn lexicographic_key_breaks_remaining_ties() {
        let ordering = cmp_cross_collection(
            0.5, 1, None, ("acts", "b"),
            0.5, 1, None, ("acts", "a"),
        );
        assert_eq!(ordering, std::cmp::Ordering::Greater);
    }
}
