//! The Agent Graph Runtime: translate → retrieve → generate over an
//! `AgentFrame`, with per-stage soft timeouts and graceful-degradation
//! failure semantics.
//!
//! Grounded on `Backend/services/langgraph_agent.py`'s node functions and
//! `ploke-rag/src/core/mod.rs`'s `tokio::time::timeout`-around-a-stage
//! pattern (`bm25_timeout_ms` guarding a channel recv here becomes a
//! per-node timeout guarding translate/retrieve/generate).

use std::sync::Arc;
use std::time::Duration;

use lexrag_core::{AgentFrame, Citation, Message};
use lexrag_embed::Translator;
use lexrag_llm::{ChatOptions, Gateway};
use lexrag_retrieve::HybridRetriever;
use tracing::{instrument, warn};

use crate::checkpoint::CheckpointStore;
use crate::prompt::assemble_chat_messages;
use crate::stage::{should_translate, Stage};

const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(10);
const RETRIEVE_TIMEOUT: Duration = Duration::from_secs(5);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);
const RETRIEVE_K: usize = 5;

/// Fixed apology returned when `generate_node` fails or times out. Distinct
/// from `lexrag_llm::FIXED_APOLOGY` (a provider-call-level fallback) since
/// this one also covers a generate-stage timeout, which never reaches the
/// gateway at all.
const GENERATION_FAILURE_APOLOGY: &str =
    "I'm sorry, I wasn't able to generate a response just now. Please try again shortly.";

pub struct AgentRuntime {
    translator: Arc<Translator>,
    retriever: Arc<HybridRetriever>,
    gateway: Arc<Gateway>,
    checkpoints: Arc<CheckpointStore>,
}

impl AgentRuntime {
    pub fn new(
        translator: Arc<Translator>,
        retriever: Arc<HybridRetriever>,
        gateway: Arc<Gateway>,
        checkpoints: Arc<CheckpointStore>,
    ) -> Self {
        Self { translator, retriever, gateway, checkpoints }
    }

    /// Run one turn for `session_id`. `incoming_history` is the caller's
    /// `history[]` argument; per the facade's resolved merge policy it only
    /// seeds the session the first time `session_id` is seen.
    #[instrument(skip(self, incoming_history), fields(session_id, language = %language))]
    pub async fn run(&self, query: &str, language: &str, session_id: &str, incoming_history: Vec<Message>) -> AgentFrame {
        let mut frame = AgentFrame::new(query, language);

        let prior = if self.checkpoints.is_new(session_id) {
            incoming_history
        } else {
            frame.history_ignored = !incoming_history.is_empty();
            self.checkpoints.load(session_id)
        };
        frame.messages = prior;

        if should_translate(&frame) == Stage::Translate {
            self.translate_node(&mut frame).await;
        }
        self.retrieve_node(&mut frame).await;
        self.generate_node(&mut frame, session_id).await;
        frame
    }

    /// `translate_node`: replace `query` with its English translation when
    /// the frame's language isn't `"en"`. A timeout or translator
    /// degradation both fall back to the original query.
    async fn translate_node(&self, frame: &mut AgentFrame) {
        let translated = tokio::time::timeout(
            TRANSLATE_TIMEOUT,
            self.translator.translate(&frame.query, &frame.language, "en"),
        )
        .await;
        match translated {
            Ok(text) => frame.query = text,
            Err(_) => {
                warn!(session_query = %frame.original_query, "translate_node timed out, falling back to original query");
            }
        }
    }

    /// `retrieve_node`: hybrid retrieval with the fixed k=5, populating
    /// `context` (newline-joined contents) and `citations` (deduplicated
    /// names). A timeout, a panicked task, and a per-request retrieval
    /// error (including the fatal embedder/index dimension mismatch) all
    /// proceed to `generate_node` with empty context — the mismatch is a
    /// configuration bug worth logging loudly, not a reason to abort the
    /// turn the user is waiting on.
    async fn retrieve_node(&self, frame: &mut AgentFrame) {
        let retriever = Arc::clone(&self.retriever);
        let query = frame.query.clone();
        let fused = tokio::time::timeout(
            RETRIEVE_TIMEOUT,
            tokio::task::spawn_blocking(move || retriever.retrieve(&query, RETRIEVE_K)),
        )
        .await;

        let results = match fused {
            Ok(Ok(Ok(results))) => results,
            Ok(Ok(Err(err))) => {
                tracing::error!(error = %err, "retrieve_node failed, proceeding with empty context");
                Vec::new()
            }
            Ok(Err(join_err)) => {
                warn!(error = %join_err, "retrieve_node task panicked, proceeding with empty context");
                Vec::new()
            }
            Err(_) => {
                warn!("retrieve_node timed out, proceeding with empty context");
                Vec::new()
            }
        };

        let mut seen_names = std::collections::HashSet::new();
        let mut context_lines = Vec::with_capacity(results.len());
        for fused_result in results {
            let doc = fused_result.document;
            context_lines.push(doc.content.clone());
            if seen_names.insert(doc.name.clone()) {
                frame.citations.push(Citation { type_: doc.type_.clone(), name: doc.name.clone() });
            }
            frame.retrieved.push(doc);
        }
        frame.context = context_lines.join("\n");
    }

    /// `generate_node`: assemble the prompt, call the LLM Gateway, append
    /// the assistant reply to the session. On generation failure or
    /// timeout: persist the user turn only, return the fixed apology.
    async fn generate_node(&self, frame: &mut AgentFrame, session_id: &str) {
        let citation_names: Vec<String> = frame.citations.iter().map(|c| c.name.clone()).collect();
        let chat_messages = assemble_chat_messages(
            &frame.context,
            &citation_names,
            &frame.language,
            &frame.messages,
            &frame.original_query,
        );

        let gateway = Arc::clone(&self.gateway);
        let result = tokio::time::timeout(GENERATE_TIMEOUT, gateway.try_chat(&chat_messages, ChatOptions::qa())).await;

        frame.messages.push(Message::user(frame.original_query.clone()));

        match result {
            Ok(Ok(response)) => {
                frame.messages.push(Message::assistant(response.clone()));
                frame.response = Some(response);
            }
            Ok(Err(err)) => {
                warn!(error = %err.diagnostic(), "generate_node failed, persisting user turn only");
                frame.response = Some(GENERATION_FAILURE_APOLOGY.to_string());
            }
            Err(_) => {
                warn!("generate_node timed out, persisting user turn only");
                frame.response = Some(GENERATION_FAILURE_APOLOGY.to_string());
            }
        }

        self.checkpoints.store(session_id, frame.messages.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrag_embed::Embedder;
    use lexrag_index::IndexStore;
    use lexrag_llm::Provider;

    /// A stub provider that echoes a fixed reply, so runtime tests never
    /// make a real network call.
    struct StubProvider;

    #[async_trait::async_trait]
    impl Provider for StubProvider {
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

    fn degraded_runtime() -> AgentRuntime {
        let translator = Arc::new(Translator::new("/nonexistent/lexrag-test-translator"));
        let store = Arc::new(IndexStore::new("/nonexistent/lexrag-test-data"));
        let embedder = Arc::new(Embedder::new("/nonexistent/lexrag-test-model"));
        let retriever = Arc::new(HybridRetriever::new(store, embedder));
        let gateway = Arc::new(Gateway::from_provider(Box::new(StubProvider)));
        let checkpoints = Arc::new(CheckpointStore::new());
        AgentRuntime::new(translator, retriever, gateway, checkpoints)
    }

    #[tokio::test]
    async fn english_query_skips_translation_and_produces_a_response() {
        let runtime = degraded_runtime();
        let frame = runtime.run("what is the rule?", "en", "s1", Vec::new()).await;
        assert_eq!(frame.query, frame.original_query);
        assert_eq!(frame.response.as_deref(), Some("stub answer"));
        assert_eq!(frame.messages.len(), 2); // user + assistant
    }

    #[tokio::test]
    async fn non_english_query_enters_the_translate_stage() {
        let runtime = degraded_runtime();
        // The degraded translator (no model directory) is the identity
        // function, but it still must run: a non-"en" frame enters at
        // Translate per `should_translate`, and the generate stage still
        // sees the (untranslated, since identity) query end to end.
        let frame = runtime.run("kumak thiyenawada?", "si", "s-translate", Vec::new()).await;
        assert_eq!(frame.query, "kumak thiyenawada?");
        assert_eq!(frame.language, "si");
        assert_eq!(frame.response.as_deref(), Some("stub answer"));
    }

    #[tokio::test]
    async fn session_monotonicity_across_two_turns() {
        let runtime = degraded_runtime();
        let _ = runtime.run("Q1", "en", "s1", Vec::new()).await;
        let before = runtime.checkpoints.load("s1").len();
        let _ = runtime.run("Q2", "en", "s1", Vec::new()).await;
        let after = runtime.checkpoints.load("s1").len();
        assert_eq!(after, before + 2);
    }

    #[tokio::test]
    async fn second_turn_prompt_carries_the_first_turns_question_and_answer_verbatim() {
        let runtime = degraded_runtime();
        let _ = runtime.run("what is the filing deadline?", "en", "s-continuity", Vec::new()).await;
        let frame2 = runtime.run("and for appeals?", "en", "s-continuity", Vec::new()).await;

        let prior = runtime.checkpoints.load("s-continuity");
        // Checkpoint after turn 2 holds exactly 4 messages: Q1, A1, Q2, A2.
        assert_eq!(prior.len(), 4);
        assert_eq!(prior[0].content, "what is the filing deadline?");
        assert_eq!(prior[1].content, "stub answer");

        let chat_messages = assemble_chat_messages(
            &frame2.context,
            &[],
            &frame2.language,
            &prior[..2],
            &frame2.original_query,
        );
        assert!(chat_messages.iter().any(|m| m.content == "what is the filing deadline?"));
        assert!(chat_messages.iter().any(|m| m.content == "stub answer"));
        assert!(chat_messages.iter().any(|m| m.content == "and for appeals?"));
    }

    #[tokio::test]
    async fn first_call_seeds_from_history_second_call_ignores_it() {
        let runtime = degraded_runtime();
        let seeded = vec![Message::user("old Q"), Message::assistant("old A")];
        let frame1 = runtime.run("Q1", "en", "s2", seeded.clone()).await;
        assert!(!frame1.history_ignored);
        assert_eq!(frame1.messages[0].content, "old Q");

        let frame2 = runtime.run("Q2", "en", "s2", vec![Message::user("ignored")]).await;
        assert!(frame2.history_ignored);
    }
}
