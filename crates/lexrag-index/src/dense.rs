//! Flat, brute-force dense vector index.
//!
//! The original service loads a prebuilt libfaiss index; no Rust crate in
//! this workspace's dependency graph reads that binary format, so the
//! on-disk `*.faiss` artifact here is this crate's own flat-vector layout
//! (see `DESIGN.md`'s Open Question resolution). Search semantics — L2
//! nearest neighbors, scores derived by the caller as `1/(1+distance)` —
//! match the original exactly.

use std::path::Path;

use lexrag_error::Error;

/// N vectors of a fixed dimension, searched by brute-force L2 distance.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DenseIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl DenseIndex {
    pub fn new(vectors: Vec<Vec<f32>>) -> Self {
        let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
        Self { dim, vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::IndexLoadError(format!("{}: {e}", path.display())))?;
        bincode::deserialize(&bytes)
            .map_err(|e| Error::IndexLoadError(format!("{}: {e}", path.display())))
    }

    /// Nearest neighbors of `query` by L2 distance, ascending (closest
    /// first), truncated to `k`. Returns `(row_index, distance)` pairs.
    ///
    /// A query whose dimension disagrees with this index's own dimension is
    /// a fatal configuration error (the Embedder and this dense index were
    /// built from different models), not a per-row skip — it fails the
    /// whole search rather than silently returning whatever rows happen to
    /// still match.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, Error> {
        if !self.is_empty() && query.len() != self.dim {
            return Err(Error::ConfigMissing(format!(
                "dense index dimension {} does not match query dimension {}",
                self.dim,
                query.len()
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(_, v)| v.len() == query.len())
            .map(|(i, v)| (i, l2_distance(query, v)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_neighbor_is_the_closest_vector() {
        let idx = DenseIndex::new(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]]);
        let hits = idx.search(&[0.9, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 0);
    }

    #[test]
    fn a_single_corrupted_row_is_dropped_not_fatal() {
        let idx = DenseIndex::new(vec![vec![0.0, 0.0], vec![1.0, 1.0, 1.0]]);
        let hits = idx.search(&[0.0, 0.0], 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);
    }

    #[test]
    fn query_dimension_disagreeing_with_the_index_is_a_fatal_config_error() {
        let idx = DenseIndex::new(vec![vec![0.0, 0.0], vec![1.0, 0.0]]);
        let result = idx.search(&[0.0, 0.0, 0.0], 5);
        assert!(matches!(result, Err(Error::ConfigMissing(_))));
    }

    #[test]
    fn an_empty_index_never_reports_a_dimension_mismatch() {
        let idx = DenseIndex::new(Vec::new());
        assert_eq!(idx.search(&[0.0, 0.0, 0.0], 5).unwrap().len(), 0);
    }
}
