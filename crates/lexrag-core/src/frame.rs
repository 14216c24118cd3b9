use crate::document::{Citation, Document};
use crate::session::Message;

/// Per-invocation working state threaded through the Agent Graph Runtime's
/// nodes. Created per request, discarded after the response is returned —
/// nothing here outlives a single call.
#[derive(Debug, Clone)]
pub struct AgentFrame {
    /// The query as currently understood; starts equal to `original_query`
    /// and is replaced in place by `translate_node` when translation runs.
    pub query: String,
    pub original_query: String,
    pub language: String,
    pub context: String,
    pub retrieved: Vec<Document>,
    pub citations: Vec<Citation>,
    /// Prior turns loaded from the checkpoint store, plus this turn's user
    /// and (if generation succeeds) assistant messages.
    pub messages: Vec<Message>,
    pub response: Option<String>,
    /// Set when the caller's `history[]` argument was dropped in favor of
    /// an existing checkpoint; surfaced for observability, not behavior.
    pub history_ignored: bool,
}

impl AgentFrame {
    pub fn new(query: impl Into<String>, language: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            original_query: query.clone(),
            query,
            language: language.into(),
            context: String::new(),
            retrieved: Vec::new(),
            citations: Vec::new(),
            messages: Vec::new(),
            response: None,
            history_ignored: false,
        }
    }
}
