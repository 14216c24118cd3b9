//! A full turn through the Agent Graph Runtime against a real (fixture)
//! index: retrieval should actually find the seeded document and the
//! generated answer's citations should reflect it, not just an empty
//! degraded path as the in-crate unit tests exercise.

use std::sync::Arc;

use lexrag_agent::{AgentRuntime, CheckpointStore};
use lexrag_core::Message;
use lexrag_embed::{Embedder, Translator};
use lexrag_index::IndexStore;
use lexrag_llm::{ChatOptions, Gateway, LlmError, Provider};
use lexrag_retrieve::HybridRetriever;

struct EchoingStubProvider;

#[async_trait::async_trait]
impl Provider for EchoingStubProvider {
    async fn generate(&self, _prompt: &str, _opts: ChatOptions) -> Result<String, LlmError> {
        Ok("Quarterly council meetings are required. [bill-1]".to_string())
    }

    async fn chat(&self, _messages: &[Message], _opts: ChatOptions) -> Result<String, LlmError> {
        Ok("Quarterly council meetings are required. [bill-1]".to_string())
    }

    fn model_name(&self) -> &str {
        "echo-stub"
    }
}

fn fixture_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("lexrag-agent-it-{}", std::process::id()))
}

fn seed_bills_collection(dir: &std::path::Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("bills.tsv"),
        "name\ttype\tcontent\nbill-1\tbills\tThe council shall meet quarterly to review budgets.\n",
    )
    .unwrap();
    let corpus: Vec<Vec<String>> =
        vec![vec!["council".into(), "shall".into(), "meet".into(), "quarterly".into(), "review".into(), "budgets".into()]];
    std::fs::write(dir.join("bills_bm25.bin"), bincode::serialize(&corpus).unwrap()).unwrap();
}

#[tokio::test]
async fn a_seeded_collection_is_retrieved_and_cited_in_the_response() {
    let dir = fixture_dir();
    seed_bills_collection(&dir);

    let store = Arc::new(IndexStore::new(&dir));
    store.initialize();
    let embedder = Arc::new(Embedder::new("/nonexistent/lexrag-test-model"));
    let translator = Arc::new(Translator::new("/nonexistent/lexrag-test-translator"));
    let retriever = Arc::new(HybridRetriever::new(store, embedder));
    let gateway = Arc::new(Gateway::from_provider(Box::new(EchoingStubProvider)));
    let checkpoints = Arc::new(CheckpointStore::new());
    let runtime = AgentRuntime::new(translator, retriever, gateway, checkpoints);

    let frame = runtime.run("How often must the council meet?", "en", "it-session", Vec::new()).await;

    assert!(frame.citations.iter().any(|c| c.name == "bill-1"));
    assert!(frame.context.contains("quarterly"));
    assert_eq!(frame.response.as_deref(), Some("Quarterly council meetings are required. [bill-1]"));

    std::fs::remove_dir_all(&dir).ok();
}
