//! The health surface: provider/model identity, cache state of the two
//! singleton models, and how many collections are usable. Database
//! reachability is accepted as an opaque caller-supplied bool — this crate
//! has no database dependency of its own.

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthStatus {
    pub db_reachable: bool,
    pub llm_provider_model: String,
    pub retriever_cached: bool,
    pub embedder_cached: bool,
    pub usable_collections: usize,
}
