//! The Hybrid Retriever: per-collection dense+sparse search, fused by RRF,
//! then merged and re-ranked across collections.
//!
//! Grounded on `Backend/services/langchain_retriever.py`'s `HybridRetriever`
//! for the overall shape (per-collection FAISS + BM25, RRF, cross-source
//! dedup) and `ploke-rag::core::RagService` for the concurrent-service API
//! surface, generalized to use its own tie-break rule (see
//! `fusion::cmp_cross_collection`) rather than `ploke-rag`'s stable-UUID one.

use std::collections::HashMap;
use std::sync::Arc;

use lexrag_core::{pluralize_type, Document, FusedResult};
use lexrag_embed::Embedder;
use lexrag_error::Error;
use lexrag_index::IndexStore;
use tracing::instrument;

use crate::fusion::{cmp_cross_collection, min_max_normalize, rrf_fuse};

pub struct HybridRetriever {
    store: Arc<IndexStore>,
    embedder: Arc<Embedder>,
}

struct Candidate {
    document: Document,
    rrf_score: f32,
    lists_appeared_in: u8,
    dense_rank: Option<usize>,
}

impl HybridRetriever {
    pub fn new(store: Arc<IndexStore>, embedder: Arc<Embedder>) -> Self {
        Self { store, embedder }
    }

    /// `retrieve(query, k) -> ordered sequence of (Document, fused_score)`
    /// of length <= k. An empty query returns an empty result without
    /// invoking the embedder.
    ///
    /// Returns `Err(Error::ConfigMissing(_))` if any collection's dense
    /// index dimension disagrees with the Embedder's output dimension —
    /// that combination can never produce a meaningful search and is a
    /// configuration bug, not a per-request degradation.
    #[instrument(skip(self), fields(k))]
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<FusedResult>, Error> {
        if query.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let snapshot = self.store.snapshot();
        // Embed once, shared across every collection's dense path. A
        // missing/unavailable embedder degrades the dense path only — the
        // sparse path still runs, per the Collection's own partial-usable
        // contract.
        let query_vector = self.embedder.embed(query).ok();

        let mut merged: HashMap<(String, String), Candidate> = HashMap::new();

        for collection in snapshot.values() {
            if !collection.is_usable() {
                continue;
            }

            let dense_hits: Vec<(usize, f32)> = match (&collection.dense, &query_vector) {
                (Some(idx), Some(qv)) => idx
                    .search(qv, k)?
                    .into_iter()
                    .map(|(row, distance)| (row, 1.0 / (1.0 + distance)))
                    .collect(),
                _ => Vec::new(),
            };

            let sparse_hits = match &collection.sparse {
                Some(idx) => min_max_normalize(&idx.search(query, k)),
                None => Vec::new(),
            };

            let mut fused = rrf_fuse(&dense_hits, &sparse_hits);
            fused.truncate(k);

            for entry in fused {
                let Some(document) = collection.document_at(entry.row_idx) else { continue };
                let identity = (document.collection_key.clone(), document.name.clone());
                let replace = match merged.get(&identity) {
                    None => true,
                    Some(existing) => entry.rrf_score > existing.rrf_score,
                };
                if replace {
                    merged.insert(
                        identity,
                        Candidate {
                            document,
                            rrf_score: entry.rrf_score,
                            lists_appeared_in: entry.lists_appeared_in,
                            dense_rank: entry.dense_rank,
                        },
                    );
                }
            }
        }

        let mut candidates: Vec<Candidate> = merged.into_values().collect();
        candidates.sort_by(|a, b| {
            cmp_cross_collection(
                a.rrf_score,
                a.lists_appeared_in,
                a.dense_rank,
                (&a.document.collection_key, &a.document.name),
                b.rrf_score,
                b.lists_appeared_in,
                b.dense_rank,
                (&b.document.collection_key, &b.document.name),
            )
        });
        candidates.truncate(k);

        Ok(candidates
            .into_iter()
            .map(|c| FusedResult { document: c.document, rrf_score: c.rrf_score })
            .collect())
    }

    /// Legacy parallel-arrays surface: `(contents[], filenames[])`, each
    /// filename rendered as `<type-or-pluralized-type>/<name>`, preserving
    /// `retrieve`'s result order.
    pub fn retrieve_doc(&self, query: &str, top_k: usize) -> Result<(Vec<String>, Vec<String>), Error> {
        let results = self.retrieve(query, top_k)?;
        let mut contents = Vec::with_capacity(results.len());
        let mut filenames = Vec::with_capacity(results.len());
        for fused in results {
            let doc = fused.document;
            filenames.push(format!("{}/{}", pluralize_type(&doc.type_), doc.name));
            contents.push(doc.content);
        }
        Ok((contents, filenames))
    }
}
