//! Local source→English (and English→source) translator.
//!
//! Grounded on `Backend/services/translator.py`'s M2M100 loading contract
//! (weights read once from `<data>/models/<translator-name>/`), re-expressed
//! with a `candle-transformers` Marian-style encoder-decoder in place of
//! M2M100 — candle's model zoo ships Marian MT, not M2M100, and the two are
//! architecturally interchangeable for this purpose (greedy-decoded
//! seq2seq translation). Unlike the Python original, which raises on a
//! missing model directory, `translate` here is the identity function when
//! unavailable — translation failure must never be fatal.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::marian::{Config, MTModel};
use tokenizers::Tokenizer;
use tokio::sync::Mutex;
use tracing::warn;

use lexrag_error::Error;

const MAX_NEW_TOKENS: usize = 256;

struct LocalTranslator {
    model: MTModel,
    tokenizer: Tokenizer,
    device: Device,
    bos_token_id: u32,
    eos_token_id: u32,
}

impl LocalTranslator {
    fn load(model_dir: &Path) -> Result<Self, Error> {
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

        let config: Config = serde_json::from_str(
            &std::fs::read_to_string(&config_path)
                .map_err(|e| Error::ModelUnavailable(format!("reading config.json: {e}")))?,
        )
        .map_err(|e| Error::ModelUnavailable(format!("parsing config.json: {e}")))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::ModelUnavailable(format!("loading tokenizer: {e}")))?;

        let device = Device::Cpu;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| Error::ModelUnavailable(format!("loading weights: {e}")))?
        };
        let model = MTModel::new(&config, vb)
            .map_err(|e| Error::ModelUnavailable(format!("constructing model: {e}")))?;

        Ok(Self {
            model,
            tokenizer,
            device,
            bos_token_id: config.decoder_start_token_id.unwrap_or(0),
            eos_token_id: config.eos_token_id,
        })
    }

    fn translate(&mut self, text: &str) -> Result<String, Error> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::ProviderInvalidOutput(format!("tokenization failed: {e}")))?;
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;

        let encoder_out = self
            .model
            .encoder()
            .forward(&input_ids, 0)
            .map_err(|e| Error::ProviderInvalidOutput(format!("encoder forward failed: {e}")))?;

        let mut decoded_ids = vec![self.bos_token_id];
        for _ in 0..MAX_NEW_TOKENS {
            let decoder_input = Tensor::new(decoded_ids.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
            let logits = self
                .model
                .decode(&decoder_input, &encoder_out, decoded_ids.len() - 1)
                .map_err(|e| Error::ProviderInvalidOutput(format!("decoder forward failed: {e}")))?;
            let next_id = logits
                .squeeze(0)
                .and_then(|t| t.argmax(candle_core::D::Minus1))
                .and_then(|t| t.to_scalar::<u32>())
                .map_err(|e| Error::ProviderInvalidOutput(e.to_string()))?;
            if next_id == self.eos_token_id {
                break;
            }
            decoded_ids.push(next_id);
        }

        self.tokenizer
            .decode(&decoded_ids[1..], true)
            .map_err(|e| Error::ProviderInvalidOutput(format!("detokenization failed: {e}")))
    }
}

/// Process-wide translator. Concurrent calls are serialized behind a
/// `tokio::sync::Mutex` — a simple mutex is explicitly sanctioned for the
/// translator since it is used far less often than the Embedder.
pub struct Translator {
    model_dir: PathBuf,
    inner: Mutex<Option<LocalTranslator>>,
}

impl Translator {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self { model_dir: model_dir.into(), inner: Mutex::new(None) }
    }

    pub async fn initialize(&self) {
        match LocalTranslator::load(&self.model_dir) {
            Ok(t) => {
                tracing::info!(dir = %self.model_dir.display(), "translator loaded");
                *self.inner.lock().await = Some(t);
            }
            Err(e) => {
                warn!(dir = %self.model_dir.display(), error = %e, "translator unavailable, translate() will be identity");
            }
        }
    }

    pub async fn is_cached(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    /// Translate `text` from `src_lang` to `tgt_lang`. When the model is
    /// unavailable this is the identity function and never fails the
    /// request — only a degradation notice is logged.
    pub async fn translate(&self, text: &str, src_lang: &str, tgt_lang: &str) -> String {
        let mut guard = self.inner.lock().await;
        match guard.as_mut() {
            Some(model) => match model.translate(text) {
                Ok(translated) => translated,
                Err(e) => {
                    warn!(src_lang, tgt_lang, error = %e, "translation failed, falling back to original text");
                    text.to_string()
                }
            },
            None => {
                warn!(src_lang, tgt_lang, "translator unavailable, returning original text");
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn translate_is_identity_when_model_unavailable() {
        let translator = Translator::new("/nonexistent/lexrag-test-translator");
        translator.initialize().await;
        assert!(!translator.is_cached().await);
        let out = translator.translate("hello world", "en", "si").await;
        assert_eq!(out, "hello world");
    }
}
