//! The provider-abstracted LLM Gateway: one trait, two backends, and a
//! fixed apology that stands in for provider errors at the caller boundary.
//!
//! Grounded on `ploke-llm/src/lib.rs`'s client-behind-a-trait shape and
//! `Backend/config/llm_config.py`'s `get_generative_client` factory, which
//! fails at construction time rather than on first use when credentials are
//! absent.

use lexrag_core::Message;
use tracing::{instrument, warn};

use crate::error::LlmError;
use crate::native::NativeProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Text callers see when a provider call fails. Never includes raw provider
/// error text.
pub const FIXED_APOLOGY: &str =
    "I'm sorry, I wasn't able to generate a response just now. Please try again shortly.";

pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Per-call sampling parameters. The gateway's callers (summarize/recommend/
/// generate) each pick their own defaults; the gateway applies no opinion of
/// its own about which temperature a task should use.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatOptions {
    pub fn qa() -> Self {
        Self { temperature: 0.3, max_tokens: DEFAULT_MAX_TOKENS }
    }

    pub fn recommendation() -> Self {
        Self { temperature: 0.5, max_tokens: DEFAULT_MAX_TOKENS }
    }

    pub fn summary() -> Self {
        Self { temperature: 0.2, max_tokens: DEFAULT_MAX_TOKENS }
    }
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, prompt: &str, opts: ChatOptions) -> Result<String, LlmError>;
    async fn chat(&self, messages: &[Message], opts: ChatOptions) -> Result<String, LlmError>;
    fn model_name(&self) -> &str;
}

/// Configuration read once at construction. Missing credentials are a fail
/// -fast `ConfigMissing`, never a deferred runtime surprise.
pub struct GatewayConfig {
    pub backend: BackendKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
}

pub enum BackendKind {
    Native,
    OpenAiCompat,
}

/// The LLM Gateway. One instance per process; constructed once from
/// environment-sourced configuration and shared behind an `Arc` by the
/// Agent Graph Runtime and the Q&A Facade's summarize/recommend paths.
/// Held as `Box<dyn Provider>` (rather than an enum over the two concrete
/// backends) so tests can construct a `Gateway` around a stub provider
/// without making a real network call.
pub struct Gateway {
    provider: Box<dyn Provider>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Result<Self, LlmError> {
        let provider: Box<dyn Provider> = match config.backend {
            BackendKind::Native => Box::new(NativeProvider::new(
                config.api_key.ok_or_else(|| {
                    LlmError::ConfigMissing("native provider requires an api key".into())
                })?,
                config.model,
            )),
            BackendKind::OpenAiCompat => Box::new(OpenAiCompatProvider::new(
                config.api_key.ok_or_else(|| {
                    LlmError::ConfigMissing("openai-compatible provider requires an api key".into())
                })?,
                config.base_url.ok_or_else(|| {
                    LlmError::ConfigMissing("openai-compatible provider requires a base url".into())
                })?,
                config.model,
            )?),
        };
        Ok(Self { provider })
    }

    /// Construct a Gateway around an arbitrary `Provider`, bypassing the
    /// fail-fast credential check in [`Gateway::new`]. Used by tests to
    /// inject a stub provider; production code should use `new`.
    pub fn from_provider(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Raw provider call, error exposed. Used by callers (the Agent Graph
    /// Runtime's `generate_node`) that need to distinguish failure from
    /// success-with-apology-text for their own persistence semantics.
    #[instrument(skip(self, prompt))]
    pub async fn try_generate(&self, prompt: &str, opts: ChatOptions) -> Result<String, LlmError> {
        self.provider.generate(prompt, opts).await
    }

    #[instrument(skip(self, messages))]
    pub async fn try_chat(&self, messages: &[Message], opts: ChatOptions) -> Result<String, LlmError> {
        self.provider.chat(messages, opts).await
    }

    /// Convenience wrapper for callers (summarize/recommend) who want the
    /// failure policy applied inline: a fixed apology string on error, never
    /// the raw provider error text.
    pub async fn generate(&self, prompt: &str, opts: ChatOptions) -> String {
        let result = self.try_generate(prompt, opts).await;
        self.unwrap_or_apology(result)
    }

    pub async fn chat(&self, messages: &[Message], opts: ChatOptions) -> String {
        let result = self.try_chat(messages, opts).await;
        self.unwrap_or_apology(result)
    }

    fn unwrap_or_apology(&self, result: Result<String, LlmError>) -> String {
        match result {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err.diagnostic(), "llm provider call failed, returning fixed apology");
                FIXED_APOLOGY.to_string()
            }
        }
    }
}
