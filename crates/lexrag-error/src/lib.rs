//! Workspace-wide error types and severity classification for lexrag.
//!
//! A single [`Error`] enum is shared across crates so callers can match on
//! coarse kinds without depending on every crate's private error type. Each
//! variant corresponds to one of the error kinds in the service's error
//! table: which ones fail startup, which degrade silently, and which are
//! not errors at all from the caller's point of view.

pub mod severity;

pub use severity::Severity;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type shared across the lexrag workspace.
#[derive(Debug, Clone, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Missing or invalid configuration discovered at startup (e.g. no
    /// provider API key for the selected `LLM_PROVIDER`). Must fail startup
    /// loudly.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// The Embedder or Translator model could not be loaded from disk. The
    /// service still starts, but the affected capability reports degraded.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single index artifact (dense/sparse/content/metadata file) failed
    /// to load. Logged and skipped; never fails startup.
    #[error("index load error: {0}")]
    IndexLoadError(String),

    /// Network or provider-side failure calling an LLM or translation
    /// backend. Not retried; callers get a fixed apology string.
    #[error("provider transient error: {0}")]
    ProviderTransient(String),

    /// The provider responded, but with empty or unparseable output.
    /// Handled identically to [`Error::ProviderTransient`].
    #[error("provider returned invalid output: {0}")]
    ProviderInvalidOutput(String),

    /// The in-flight operation was cancelled because the caller
    /// disconnected. Abort cheaply; no session state may be mutated.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::ConfigMissing(_) => Severity::Fatal,
            Error::ModelUnavailable(_) | Error::IndexLoadError(_) => Severity::Warning,
            Error::ProviderTransient(_) | Error::ProviderInvalidOutput(_) => Severity::Error,
            Error::Cancelled => Severity::Warning,
        }
    }

    /// True for kinds that the facade should never surface as raw provider
    /// text — callers instead get the fixed apology string.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::ProviderTransient(_) | Error::ProviderInvalidOutput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_missing_is_fatal() {
        assert_eq!(
            Error::ConfigMissing("LLM_API_KEY".into()).severity(),
            Severity::Fatal
        );
    }

    #[test]
    fn model_unavailable_is_warning_not_fatal() {
        assert_eq!(
            Error::ModelUnavailable("encoder".into()).severity(),
            Severity::Warning
        );
    }

    #[test]
    fn provider_errors_are_flagged_for_apology_path() {
        assert!(Error::ProviderTransient("timeout".into()).is_provider_failure());
        assert!(Error::ProviderInvalidOutput("empty body".into()).is_provider_failure());
        assert!(!Error::Cancelled.is_provider_failure());
    }
}
