//! The Q&A Facade: the external request/response shape over the Agent
//! Graph Runtime, plus the summary/recommendation pass-throughs and the
//! health surface.
//!
//! Grounded on `Backend/routers/get_ai_response.py`'s `GetAIResponseRequest`
//! (`{query, history, language}`) and its `{response, files}` reply shape,
//! extended with `session_id`, `citations`, `success`, and `error`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use lexrag_agent::AgentRuntime;
use lexrag_core::{Citation, DocumentSummary, Message, Recommendation};
use lexrag_embed::Embedder;
use lexrag_index::IndexStore;
use lexrag_llm::{ChatOptions, Gateway};
use tracing::instrument;

use crate::health::HealthStatus;
use crate::url::canonical_citation_url;

const SESSION_ID_QUERY_PREFIX_LEN: usize = 64;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct QaRequest {
    pub query: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub history: Vec<Message>,
    pub session_id: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct QaResponse {
    pub success: bool,
    pub response: String,
    pub citations: Vec<Citation>,
    pub files: Vec<String>,
    pub session_id: String,
    pub error: Option<String>,
}

pub struct QaFacade {
    runtime: Arc<AgentRuntime>,
    gateway: Arc<Gateway>,
    store: Arc<IndexStore>,
    embedder: Arc<Embedder>,
    documents_host: String,
}

impl QaFacade {
    pub fn new(
        runtime: Arc<AgentRuntime>,
        gateway: Arc<Gateway>,
        store: Arc<IndexStore>,
        embedder: Arc<Embedder>,
        documents_host: impl Into<String>,
    ) -> Self {
        Self { runtime, gateway, store, embedder, documents_host: documents_host.into() }
    }

    /// Answers `request`. This never throws: a pipeline that cannot produce
    /// an answer at all comes back as `success=false` with a diagnostic
    /// `error`, never a raw provider error.
    ///
    /// Design decision: when the Embedder has never successfully loaded,
    /// the facade short-circuits with `success=false` and a
    /// `ModelUnavailable` diagnostic rather than running the graph ("the
    /// model directory absent, a Q&A request returns success=false with
    /// error kind ModelUnavailable, no crash"), distinct from a mid-pipeline
    /// generation failure (which still returns `success=true` with the
    /// fixed apology as its answer).
    #[instrument(skip(self, request), fields(language = %request.language))]
    pub async fn ask(&self, request: QaRequest) -> QaResponse {
        let session_id = request.session_id.clone().unwrap_or_else(|| default_session_id(&request.query));

        if !self.embedder.is_cached() {
            return QaResponse {
                success: false,
                response: String::new(),
                citations: Vec::new(),
                files: Vec::new(),
                session_id,
                error: Some("ModelUnavailable: embedding model is not loaded".to_string()),
            };
        }

        let frame = self.runtime.run(&request.query, &request.language, &session_id, request.history).await;

        let files = frame
            .citations
            .iter()
            .filter_map(|c| canonical_citation_url(&self.documents_host, c))
            .collect();

        QaResponse {
            success: true,
            response: frame.response.unwrap_or_default(),
            citations: frame.citations,
            files,
            session_id,
            error: None,
        }
    }

    /// `summarize`: a thin LLM Gateway pass-through, `temperature=0.2`. No
    /// independent ranking or persistence logic lives here — that's the
    /// out-of-scope summary sub-agent's concern.
    pub async fn summarize(&self, name: &str, collection_key: &str, content: &str) -> DocumentSummary {
        let prompt = format!(
            "Summarize the following legal document in 3-4 sentences for a general reader.\n\nDocument: {name}\n\n{content}"
        );
        let summary = self.gateway.generate(&prompt, ChatOptions::summary()).await;
        DocumentSummary {
            name: name.to_string(),
            collection_key: collection_key.to_string(),
            summary,
            citations: vec![Citation { type_: collection_key.to_string(), name: name.to_string() }],
        }
    }

    /// `recommend`: a thin LLM Gateway pass-through, `temperature=0.5`.
    pub async fn recommend(&self, user_context: &str) -> Vec<Recommendation> {
        let prompt = format!(
            "Given this user's stated interest, name one relevant document collection and a one-sentence reason. User interest: {user_context}"
        );
        let reason = self.gateway.generate(&prompt, ChatOptions::recommendation()).await;
        vec![Recommendation { name: "general".to_string(), collection_key: "acts".to_string(), reason }]
    }

    pub fn health(&self) -> HealthStatus {
        let status = self.store.status();
        HealthStatus {
            db_reachable: true,
            llm_provider_model: self.gateway.model_name().to_string(),
            retriever_cached: status.usable_collections > 0,
            embedder_cached: self.embedder.is_cached(),
            usable_collections: status.usable_collections,
        }
    }
}

/// A deterministic session id derived from a stable prefix of the query, for
/// callers who supply no `session_id` and don't care about persistent
/// threads. Callers who want persistent threads must supply their own
/// stable id.
fn default_session_id(query: &str) -> String {
    let prefix: String = query.chars().take(SESSION_ID_QUERY_PREFIX_LEN).collect();
    let mut hasher = DefaultHasher::new();
    prefix.hash(&mut hasher);
    format!("session-{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_id_is_deterministic_for_the_same_query_prefix() {
        assert_eq!(default_session_id("what is the budget rule?"), default_session_id("what is the budget rule?"));
    }

    #[test]
    fn default_session_id_differs_for_different_queries() {
        assert_ne!(default_session_id("query one"), default_session_id("query two"));
    }

    struct StubProvider;

    #[async_trait::async_trait]
    impl lexrag_llm::Provider for StubProvider {
        async fn generate(&self, _prompt: &str, _opts: ChatOptions) -> Result<String, lexrag_llm::LlmError> {
            Ok("stub answer".to_string())
        }

        async fn chat(&self, _messages: &[Message], _opts: ChatOptions) -> Result<String, lexrag_llm::LlmError> {
            Ok("stub answer".to_string())
        }

        fn model_name(&self) -> &str {
            "stub-model"
        }
    }

    fn degraded_facade() -> QaFacade {
        let translator = Arc::new(lexrag_embed::Translator::new("/nonexistent/lexrag-test-translator"));
        let store = Arc::new(IndexStore::new("/nonexistent/lexrag-test-data"));
        let embedder = Arc::new(Embedder::new("/nonexistent/lexrag-test-model"));
        let retriever = Arc::new(lexrag_retrieve::HybridRetriever::new(Arc::clone(&store), Arc::clone(&embedder)));
        let gateway = Arc::new(Gateway::from_provider(Box::new(StubProvider)));
        let checkpoints = Arc::new(lexrag_agent::CheckpointStore::new());
        let runtime = Arc::new(AgentRuntime::new(translator, retriever, Arc::clone(&gateway), checkpoints));
        QaFacade::new(runtime, gateway, store, embedder, "documents.gov.lk")
    }

    #[tokio::test]
    async fn degraded_startup_reports_model_unavailable_without_crashing() {
        let facade = degraded_facade();
        assert!(!facade.health().embedder_cached);
        let response = facade
            .ask(QaRequest { query: "what is the rule?".into(), language: "en".into(), history: Vec::new(), session_id: None })
            .await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("ModelUnavailable: embedding model is not loaded"));
    }

    #[tokio::test]
    async fn healthy_path_reports_zero_usable_collections_when_store_is_empty() {
        let facade = degraded_facade();
        let health = facade.health();
        assert_eq!(health.usable_collections, 0);
        assert!(!health.retriever_cached);
    }
}
