use std::collections::HashMap;

/// A retrievable unit: one row of one collection.
///
/// Content is opaque to the retriever; `name` and `type_` drive citation URL
/// construction (see `Citation`). Identity for deduplication purposes is
/// `(collection_key, name)`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub content: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub collection_key: String,
    pub metadata: Option<HashMap<String, String>>,
}

impl Document {
    /// `(collection_key, name)` identity used for cross-collection dedup.
    pub fn identity(&self) -> (&str, &str) {
        (&self.collection_key, &self.name)
    }

    /// Within-query identity fallback when metadata is missing: a prefix of
    /// the content, used only to distinguish documents that share no name.
    pub fn content_prefix_key(&self, len: usize) -> &str {
        let end = self.content.char_indices().nth(len).map(|(i, _)| i).unwrap_or(self.content.len());
        &self.content[..end]
    }
}

/// One scored hit from a single retrieval path (dense or sparse). Scores are
/// monotone within a path but not comparable across paths.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub document: Document,
    pub score: f32,
}

/// A document after Reciprocal Rank Fusion, deduplicated across retrieval
/// paths and (at the top level) across collections.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FusedResult {
    pub document: Document,
    pub rrf_score: f32,
}

/// A `(type, name)` pair attributing a generated sentence to a source
/// document, plus the synthesized URL to that document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
}

/// Output shape for the summary collaborator (see the facade's
/// `summarize` pass-through). Populated entirely by an LLM call; no
/// independent ranking logic lives in the core.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DocumentSummary {
    pub name: String,
    pub collection_key: String,
    pub summary: String,
    pub citations: Vec<Citation>,
}

/// Output shape for the recommendation collaborator.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub collection_key: String,
    pub reason: String,
}
