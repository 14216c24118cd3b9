//! The LLM Gateway: one `Provider` trait behind two wire-format backends,
//! fixed-apology error containment, and per-task `ChatOptions` presets.

pub mod error;
pub mod gateway;
pub mod native;
pub mod openai_compat;

pub use error::LlmError;
pub use gateway::{BackendKind, ChatOptions, Gateway, GatewayConfig, Provider, FIXED_APOLOGY};
pub use native::NativeProvider;
pub use openai_compat::OpenAiCompatProvider;
