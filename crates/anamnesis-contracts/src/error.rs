//! Runtime error types for the anamnesis pipeline.
//!
//! These are operational failures of the runtime itself. Problems with a
//! model response are not errors: they are collected as
//! [`ValidationIssue`](crate::issue::ValidationIssue) values and end up in the
//! report.

use thiserror::Error;

/// The unified error type for the anamnesis runtime.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage was applied to a `PipelineState` in the wrong lifecycle stage.
    #[error("state machine error: {reason}")]
    StateMachineError { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The input notes could not be listed or read.
    #[error("input unavailable: {reason}")]
    InputUnavailable { reason: String },

    /// The run report could not be serialized or persisted.
    #[error("report write failed: {reason}")]
    ReportWriteFailed { reason: String },

    /// The external model call failed.
    ///
    /// Never reaches a report: the invoker swaps in the fallback payload.
    #[error("model invocation failed: {reason}")]
    ModelInvocationFailed { reason: String },

    /// A JSON Schema document could not be compiled.
    #[error("schema compilation error: {reason}")]
    SchemaCompilation { reason: String },
}

/// Convenience alias used throughout the anamnesis crates.
pub type PipelineResult<T> = Result<T, PipelineError>;
