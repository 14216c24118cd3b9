//! Environment-sourced configuration, read once at startup.
//!
//! Grounded on `Backend/config/llm_config.py`'s provider-switch-on-one-env
//! -var pattern and `ploke-llm`'s `.env`-via-`dotenvy` loading convention. A
//! missing provider credential is `ConfigMissing` and fails startup loudly —
//! this struct's constructor is where that happens.

use std::path::PathBuf;

use lexrag_error::Error;
use lexrag_llm::BackendKind;

const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_DOCUMENTS_HOST: &str = "documents.gov.lk";

pub struct Config {
    pub llm_backend: BackendKind,
    pub llm_model: String,
    pub llm_api_key: String,
    pub llm_base_url: Option<String>,
    pub data_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub tracing_enabled: bool,
}

impl Config {
    /// Load from the process environment, optionally preceded by a local
    /// `.env` file (`dotenvy`, best-effort — its absence is not an error).
    pub fn from_env() -> Result<Self, Error> {
        let _ = dotenvy::dotenv();

        let llm_backend = match std::env::var("LLM_PROVIDER").as_deref() {
            Ok("native") => BackendKind::Native,
            Ok("openai-compat") => BackendKind::OpenAiCompat,
            Ok(other) => {
                return Err(Error::ConfigMissing(format!(
                    "LLM_PROVIDER must be 'native' or 'openai-compat', got '{other}'"
                )))
            }
            Err(_) => return Err(Error::ConfigMissing("LLM_PROVIDER is not set".into())),
        };

        let llm_model = std::env::var("LLM_MODEL")
            .map_err(|_| Error::ConfigMissing("LLM_MODEL is not set".into()))?;

        let key_var = match llm_backend {
            BackendKind::Native => "NATIVE_LLM_API_KEY",
            BackendKind::OpenAiCompat => "OPENAI_COMPAT_API_KEY",
        };
        let llm_api_key = std::env::var(key_var)
            .map_err(|_| Error::ConfigMissing(format!("{key_var} is not set for the selected LLM_PROVIDER")))?;

        let llm_base_url = match llm_backend {
            BackendKind::Native => None,
            BackendKind::OpenAiCompat => Some(
                std::env::var("OPENAI_COMPAT_BASE_URL")
                    .map_err(|_| Error::ConfigMissing("OPENAI_COMPAT_BASE_URL is not set".into()))?,
            ),
        };

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()).into();

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|raw| parse_allowed_origins(&raw))
            .unwrap_or_default();

        // Absence of observability keys silently disables tracing rather
        // than failing startup.
        let tracing_enabled = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok();

        Ok(Self { llm_backend, llm_model, llm_api_key, llm_base_url, data_dir, allowed_origins, tracing_enabled })
    }
}

fn parse_allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_origins_and_trims_whitespace() {
        let origins = parse_allowed_origins("https://a.example, https://b.example ,,https://c.example");
        assert_eq!(origins, vec!["https://a.example", "https://b.example", "https://c.example"]);
    }

    #[test]
    fn empty_string_yields_no_origins() {
        assert!(parse_allowed_origins("").is_empty());
    }
}
