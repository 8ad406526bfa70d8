//! Collaborator traits for the anamnesis pipeline.
//!
//! These traits are the boundary between the pipeline and the outside world:
//!
//! - `InputSource`: where the clinical notes come from
//! - `PromptSource`: where prompt templates come from
//! - `ModelClient`: the generative model (untrusted, fallible)
//! - `OutputValidator`: turns raw model text into a `ClinicalOutput`
//! - `ReportSink`: where the finished `RunReport` goes
//!
//! The pipeline and batch runner only ever talk to these traits, so every
//! collaborator can be swapped for a mock in tests.

use anamnesis_contracts::{
    error::PipelineResult,
    issue::ValidationIssue,
    output::ClinicalOutput,
    report::RunReport,
    state::InputItem,
};

/// Supplies the notes for a batch run.
pub trait InputSource: Send + Sync {
    /// Return every input in a stable order.
    fn list_inputs(&self) -> PipelineResult<Vec<InputItem>>;
}

/// Supplies the prompt template for a prompt version.
pub trait PromptSource: Send + Sync {
    /// Return the template for `version`.
    ///
    /// Never fails: an unavailable version must resolve to the built-in
    /// default template.
    fn load_prompt(&self, version: &str) -> String;
}

/// One request to the external model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest<'a> {
    pub system_instruction: &'a str,
    pub user_prompt: &'a str,
    pub temperature: f32,
    /// Ask the transport to enforce a JSON object response, if it can.
    pub json_output: bool,
}

/// The generative model.
///
/// Implementations are **untrusted**: any failure mode (network, auth, quota,
/// malformed response, timeout) is reported as an `Err` and the invoker
/// decides what to do with it.
pub trait ModelClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest<'_>) -> PipelineResult<String>;
}

/// Checks raw model text against the clinical output contract.
pub trait OutputValidator: Send + Sync {
    /// Return the typed output, or every issue found. The error list is
    /// never empty.
    fn validate(&self, raw: &str) -> Result<ClinicalOutput, Vec<ValidationIssue>>;
}

/// Persists a finished run report.
pub trait ReportSink: Send + Sync {
    fn save(&self, report: &RunReport) -> PipelineResult<()>;
}
