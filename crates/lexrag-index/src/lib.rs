//! The Index Store: per-collection dense and sparse retrieval artifacts,
//! loaded from a data volume and cached as a process-wide singleton with
//! atomic snapshot reload.

pub mod collection;
pub mod dense;
pub mod ingest;
pub mod sparse;
pub mod store;

pub use collection::Collection;
pub use dense::DenseIndex;
pub use ingest::RawRow;
pub use sparse::Bm25Index;
pub use store::{IndexStore, Snapshot, StoreStatus};
