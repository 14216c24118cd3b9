//! Hybrid (dense + sparse) retrieval, fused with Reciprocal Rank Fusion and
//! re-ranked across collections.

pub mod fusion;
pub mod retriever;

pub use retriever::HybridRetriever;
