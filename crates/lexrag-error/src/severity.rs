//! Coarse-grained classification for programmatic handling of errors.
//!
//! - Warning: non-fatal, the service continues in a degraded mode.
//! - Error: a single operation failed; the caller sees a clean fallback.
//! - Fatal: the service cannot start in this configuration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}
