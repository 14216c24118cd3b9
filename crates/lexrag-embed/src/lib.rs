//! Local model backends: the sentence Embedder and the Translator.

pub mod embedder;
pub mod translator;

pub use embedder::{Embedder, LocalEmbedder};
pub use translator::Translator;
