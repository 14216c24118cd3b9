//! Local sentence-embedding backend.
//!
//! Grounded on `ploke-embed::local::LocalEmbedder`, adapted to load every
//! artifact from a local directory: `hf_hub::Api`'s network-capable
//! `Api::new()`/`repo.get(...)` calls are replaced with plain `Path::join`
//! reads, satisfying "no network download at request time" outright rather
//! than by convention.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{PaddingParams, Tokenizer};

use lexrag_error::Error;

const MAX_LENGTH: usize = 256;

pub struct LocalEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl LocalEmbedder {
    /// Load `config.json`, `tokenizer.json`, and `model.safetensors` from
    /// `model_dir`. Any missing file is reported as `ModelUnavailable`
    /// rather than a hard failure — the caller decides whether that means
    /// "fail startup" (it doesn't) or "serve degraded."
    pub fn load(model_dir: &Path) -> Result<Self, Error> {
        let config_path = model_dir.join("config.json");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let weights_path = model_dir.join("model.safetensors");

        for (label, path) in [
            ("config.json", &config_path),
            ("tokenizer.json", &tokenizer_path),
            ("model.safetensors", &weights_path),
        ] {
            if !path.exists() {
                return Err(Error::ModelUnavailable(format!(
                    "{label} not found under {}",
                    model_dir.display()
                )));
            }
        }

        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| Error::ModelUnavailable(format!("reading config.json: {e}")))?;
        let config: Config = serde_json::from_str(&config_text)
            .map_err(|e| Error::ModelUnavailable(format!("parsing config.json: {e}")))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::ModelUnavailable(format!("loading tokenizer: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams { pad_to_multiple_of: Some(8), ..Default::default() }));

        let device = Device::Cpu;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| Error::ModelUnavailable(format!("loading weights: {e}")))?
        };
        let model = BertModel::load(vb, &config)
            .map_err(|e| Error::ModelUnavailable(format!("constructing model: {e}")))?;

        Ok(Self { model, tokenizer, device, dim: config.hidden_size })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        Ok(self.embed_batch(&[text])?.remove(0))
    }

    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::ProviderInvalidOutput(format!("tokenization failed: {e}")))?;

        let token_ids: Vec<Tensor> = encodings
            .iter()
            .map(|e| {
                let mut ids = e.get_ids().to_vec();
                ids.truncate(MAX_LENGTH);
                Tensor::new(ids.as_slice(), &self.device)
            })
            .collect::<candle_core::Result<_>>()
            .map_err(|e| Error::ProviderInvalidOutput(format!("tensor build failed: {e}")))?;
        let attn_mask: Vec<Tensor> = encodings
            .iter()
            .map(|e| {
                let mut mask = e.get_attention_mask().to_vec();
                mask.truncate(MAX_LENGTH);
                Tensor::new(mask.as_slice(), &self.device)
            })
            .collect::<candle_core::Result<_>>()
            .map_err(|e| Error::ProviderInvalidOutput(format!("tensor build failed: {e}")))?;

        let token_ids = Tensor::stack(&token_ids, 0)
            .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
        let attn_mask = Tensor::stack(&attn_mask, 0)
            .and_then(|t| t.to_dtype(DType::F32))
            .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;

        let token_type_ids = token_ids.zeros_like().map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
        let outputs = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attn_mask))
            .map_err(|e| Error::ProviderInvalidOutput(format!("forward pass failed: {e}")))?;

        // Mean pooling over the attention mask, then L2 normalization.
        let weights = attn_mask
            .unsqueeze(2)
            .and_then(|w| w.broadcast_as(outputs.shape()))
            .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
        let summed = (&outputs * &weights)
            .and_then(|t| t.sum_keepdim(1))
            .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
        let counts = weights
            .sum_keepdim(1)
            .and_then(|t| t.clamp(1e-9, f32::MAX))
            .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
        let pooled = (summed / counts).map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
        let norm = pooled
            .sqr()
            .and_then(|t| t.sum_keepdim(1))
            .and_then(|t| t.sqrt())
            .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
        let normalized = pooled.broadcast_div(&norm).map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;

        let mut out = Vec::with_capacity(texts.len());
        for i in 0..texts.len() {
            let row = normalized
                .i((i, ..))
                .and_then(|r| r.squeeze(0))
                .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
            out.push(row.to_vec1::<f32>().map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?);
        }
        Ok(out)
    }
}

/// Process-wide singleton wrapping [`LocalEmbedder`]. Loading happens
/// eagerly via [`Embedder::initialize`] or lazily on first [`Embedder::embed`]
/// call; either way, a missing model directory degrades rather than
/// panics or aborts startup.
pub struct Embedder {
    model_dir: PathBuf,
    inner: arc_swap::ArcSwapOption<LocalEmbedder>,
}

impl Embedder {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self { model_dir: model_dir.into(), inner: arc_swap::ArcSwapOption::from(None) }
    }

    /// Attempt to load the model now. Never returns an error: a failed
    /// load is logged and leaves the embedder in its degraded state.
    pub fn initialize(&self) {
        match LocalEmbedder::load(&self.model_dir) {
            Ok(embedder) => {
                tracing::info!(dir = %self.model_dir.display(), "embedder loaded");
                self.inner.store(Some(std::sync::Arc::new(embedder)));
            }
            Err(e) => {
                tracing::warn!(dir = %self.model_dir.display(), error = %e, "embedder unavailable, starting degraded");
            }
        }
    }

    pub fn force_reload(&self) {
        self.initialize();
    }

    pub fn is_cached(&self) -> bool {
        self.inner.load().is_some()
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        let guard = self.inner.load();
        match guard.as_ref() {
            Some(e) => e.embed(text),
            None => Err(Error::ModelUnavailable(format!("encoder not loaded from {}", self.model_dir.display()))),
        }
    }

    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error> {
        let guard = self.inner.load();
        match guard.as_ref() {
            Some(e) => e.embed_batch(texts),
            None => Err(Error::ModelUnavailable(format!("encoder not loaded from {}", self.model_dir.display()))),
        }
    }

    pub fn dim(&self) -> Option<usize> {
        self.inner.load().as_ref().map(|e| e.dim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_starts_degraded_when_model_dir_absent() {
        let embedder = Embedder::new("/nonexistent/lexrag-test-model");
        embedder.initialize();
        assert!(!embedder.is_cached());
        assert!(matches!(embedder.embed("hello"), Err(Error::ModelUnavailable(_))));
    }
}
