//! Engine error types.
//!
//! Unmet constraints are never errors — they surface as violations on an
//! otherwise successful call. Errors are reserved for invalid arguments
//! and data-source failures, which propagate unchanged.

use thiserror::Error;

/// Errors returned by the rostering engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An optimization focus name the engine does not recognize.
    #[error("unknown optimization focus: {0}")]
    UnknownOptimization(String),

    /// A (year, month) pair that is not a valid calendar month.
    #[error("invalid calendar month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    /// A failure in the external data-loading collaborator, passed through
    /// without retry or fallback.
    #[error("data source failure: {0}")]
    DataSource(#[from] Box<dyn std::error::Error + Send + Sync>),
}
