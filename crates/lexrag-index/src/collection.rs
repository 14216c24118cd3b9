use lexrag_core::Document;

use crate::dense::DenseIndex;
use crate::ingest::RawRow;
use crate::sparse::Bm25Index;

/// A named bucket of aligned retrieval artifacts. All four artifacts are
/// optional on their own, but a collection is only usable once it has a
/// document list and at least one retrieval path (see [`Collection::is_usable`]).
pub struct Collection {
    pub key: String,
    pub dense: Option<DenseIndex>,
    pub sparse: Option<Bm25Index>,
    pub rows: Option<Vec<RawRow>>,
}

impl Collection {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), dense: None, sparse: None, rows: None }
    }

    pub fn is_usable(&self) -> bool {
        self.rows.is_some() && (self.dense.is_some() || self.sparse.is_some())
    }

    pub fn len(&self) -> usize {
        self.rows.as_ref().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize row `idx` as a full `Document`, stamped with this
    /// collection's key. Returns `None` for an out-of-range index — callers
    /// are expected to treat that as "invalid index, drop it."
    pub fn document_at(&self, idx: usize) -> Option<Document> {
        let row = self.rows.as_ref()?.get(idx)?;
        Some(Document {
            content: row.content.clone(),
            name: row.name.clone(),
            type_: row.type_.clone(),
            collection_key: self.key.clone(),
            metadata: if row.extra.is_empty() { None } else { Some(row.extra.clone()) },
        })
    }
}
