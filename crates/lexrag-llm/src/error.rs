//! LLM provider errors, kept distinct from [`lexrag_error::Error`] so that
//! callers who only care about the gateway surface don't need to match on
//! index/embedding variants too.
//!
//! Grounded on `ploke-llm/src/error.rs`'s `LlmError` (request/api/timeout/
//! deserialization split, `diagnostic()` for operator-facing detail).

use lexrag_error::Error as CoreError;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm config missing: {0}")]
    ConfigMissing(String),

    #[error("llm request failed: {message}")]
    Request { message: String, url: String, is_timeout: bool },

    #[error("llm api error (status {status}): {message}")]
    Api { status: u16, message: String, url: String, body_snippet: String },

    #[error("llm response deserialization failed: {message}")]
    Deserialization { message: String, body_snippet: String },

    #[error("llm request timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl LlmError {
    /// Multi-line, operator-facing detail. Never shown to end users — see
    /// [`crate::FIXED_APOLOGY`] for what callers get instead.
    pub fn diagnostic(&self) -> String {
        match self {
            LlmError::ConfigMissing(detail) => format!("llm config missing: {detail}"),
            LlmError::Request { message, url, is_timeout } => {
                format!("request to {url} failed (timeout={is_timeout}): {message}")
            }
            LlmError::Api { status, message, url, body_snippet } => {
                format!("{url} returned {status}: {message}\nbody: {body_snippet}")
            }
            LlmError::Deserialization { message, body_snippet } => {
                format!("could not parse llm response: {message}\nbody: {body_snippet}")
            }
            LlmError::Timeout { secs } => format!("llm call exceeded {secs}s"),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Request { .. } | LlmError::Timeout { .. } | LlmError::Api { status: 429..=599, .. }
        )
    }
}

impl From<LlmError> for CoreError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ConfigMissing(detail) => CoreError::ConfigMissing(detail),
            other if other.is_transient() => CoreError::ProviderTransient(other.diagnostic()),
            other => CoreError::ProviderInvalidOutput(other.diagnostic()),
        }
    }
}
