//! Shared data model for the lexrag workspace.
//!
//! This crate is intentionally dependency-light: it defines the shapes that
//! flow between the Index Store, Hybrid Retriever, Agent Graph Runtime, and
//! Q&A Facade, without pulling in any of their implementation dependencies
//! (candle, reqwest, dashmap, ...). Every other crate in the workspace
//! depends on this one; this one depends on nothing but `serde`.

pub mod document;
pub mod frame;
pub mod naming;
pub mod session;

pub use document::{Citation, Document, DocumentSummary, FusedResult, Recommendation, RetrievalResult};
pub use frame::AgentFrame;
pub use naming::pluralize_type;
pub use session::{Message, Role, SessionState};
