//! BM25-Okapi sparse index over a pre-tokenized corpus.
//!
//! Scoring itself is delegated to the `bm25` crate (the same dependency
//! `ploke-db`'s code-aware BM25 index uses), with a natural-language
//! tokenizer in place of `ploke-db`'s identifier-splitting `CodeTokenizer` —
//! legal-document queries are ordinary words, not source identifiers.

use std::path::Path;

use bm25::{Embedder, EmbedderBuilder, Scorer, Tokenizer};
use lexrag_error::Error;

/// Lowercases and splits on runs of word characters (`[A-Za-z0-9_]+`),
/// matching the retrieval algorithm's "tokenize by lowercased word
/// characters" rule verbatim.
#[derive(Debug, Clone, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn tokenize_text(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut tokens = Vec::new();
        let mut cur = String::new();
        for ch in lower.chars() {
            if ch.is_alphanumeric() || ch == '_' {
                cur.push(ch);
            } else if !cur.is_empty() {
                tokens.push(std::mem::take(&mut cur));
            }
        }
        if !cur.is_empty() {
            tokens.push(cur);
        }
        tokens
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, input_text: &str) -> Vec<String> {
        Self::tokenize_text(input_text)
    }
}

pub struct Bm25Index {
    embedder: Embedder<u32, WordTokenizer>,
    scorer: Scorer<usize, u32>,
    len: usize,
}

impl Bm25Index {
    /// Build an index from a pre-tokenized corpus: one `Vec<String>` of
    /// tokens per document, in row order.
    pub fn from_corpus(corpus: Vec<Vec<String>>) -> Self {
        let total_tokens: usize = corpus.iter().map(|d| d.len()).sum();
        let avgdl = if corpus.is_empty() {
            0.0
        } else {
            total_tokens as f32 / corpus.len() as f32
        };
        let embedder = EmbedderBuilder::<u32, WordTokenizer>::with_avgdl(avgdl).build();
        let mut scorer = Scorer::<usize, u32>::new();
        for (i, tokens) in corpus.iter().enumerate() {
            // The corpus is already tokenized; joining with spaces and
            // re-running WordTokenizer over it is idempotent since every
            // stored token consists solely of word characters.
            let pseudo_text = tokens.join(" ");
            let embedding = embedder.embed(&pseudo_text);
            scorer.upsert(&i, embedding);
        }
        Self { embedder, scorer, len: corpus.len() }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::IndexLoadError(format!("{}: {e}", path.display())))?;
        let corpus: Vec<Vec<String>> = bincode::deserialize(&bytes)
            .map_err(|e| Error::IndexLoadError(format!("{}: {e}", path.display())))?;
        Ok(Self::from_corpus(corpus))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Positive-scored top-k row indices, in descending score order.
    pub fn search(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        let tokens = WordTokenizer::tokenize_text(query);
        if tokens.is_empty() {
            return Vec::new();
        }
        let pseudo_query = tokens.join(" ");
        let qemb = self.embedder.embed(&pseudo_query);
        let mut matches = self.scorer.matches(&qemb);
        matches.retain(|m| m.score > 0.0);
        if matches.len() > k {
            matches.truncate(k);
        }
        matches.into_iter().map(|m| (m.id, m.score)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Vec<String>> {
        vec![
            vec!["urban".into(), "council".into(), "budget".into(), "passes".into()],
            vec!["municipal".into(), "composition".into(), "amended".into()],
        ]
    }

    #[test]
    fn scores_the_matching_document_higher() {
        let idx = Bm25Index::from_corpus(corpus());
        let hits = idx.search("urban council budget", 5);
        assert_eq!(hits[0].0, 0);
        assert!(hits[0].1 > 0.0);
    }

    #[test]
    fn empty_query_after_tokenization_yields_no_hits() {
        let idx = Bm25Index::from_corpus(corpus());
        assert!(idx.search("!!! ???", 5).is_empty());
    }
}
