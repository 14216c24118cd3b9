//! The Q&A Facade: the externally-facing request/response surface wiring
//! together the Index Store, Embedder, Hybrid Retriever, LLM Gateway, and
//! Agent Graph Runtime into one `ask`/`summarize`/`recommend`/`health` API.

pub mod config;
pub mod facade;
pub mod health;
pub mod url;

pub use config::{Config, DEFAULT_DOCUMENTS_HOST};
pub use facade::{QaFacade, QaRequest, QaResponse};
pub use health::HealthStatus;
pub use url::{canonical_citation_url, legacy_citation_url};
