//! Per-item pipeline state.
//!
//! A `PipelineState` is created fresh for every input note and moves through
//! exactly two stages:
//!
//!   Created → Generated → Validated
//!
//! Identity fields are fixed at construction. Stage fields can only be
//! written through `record_generation` / `record_validation`, each of which
//! checks the current stage, so a state can never go backwards or be
//! written twice.

use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, PipelineResult},
    issue::ValidationIssue,
    output::ClinicalOutput,
};

/// One input note as delivered by an input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputItem {
    pub filename: String,
    pub content: String,
}

impl InputItem {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Lifecycle stage of a `PipelineState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Fresh state; no stage has run.
    Created,
    /// The model stage wrote `raw_response`.
    Generated,
    /// The validation stage wrote `parsed_output` and `errors`. Terminal.
    Validated,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Validated)
    }
}

/// The state threaded through one orchestrator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    filename: String,
    input_text: String,
    prompt_version: String,
    stage: PipelineStage,
    raw_response: Option<String>,
    parsed_output: Option<ClinicalOutput>,
    errors: Vec<ValidationIssue>,
}

impl PipelineState {
    pub fn new(
        filename: impl Into<String>,
        input_text: impl Into<String>,
        prompt_version: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            input_text: input_text.into(),
            prompt_version: prompt_version.into(),
            stage: PipelineStage::Created,
            raw_response: None,
            parsed_output: None,
            errors: Vec::new(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn prompt_version(&self) -> &str {
        &self.prompt_version
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    pub fn parsed_output(&self) -> Option<&ClinicalOutput> {
        self.parsed_output.as_ref()
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Store the model response and move `Created → Generated`.
    pub fn record_generation(&mut self, raw_response: Option<String>) -> PipelineResult<()> {
        self.expect_stage(PipelineStage::Created, "generation")?;
        self.raw_response = raw_response;
        self.stage = PipelineStage::Generated;
        Ok(())
    }

    /// Store the validation outcome and move `Generated → Validated`.
    pub fn record_validation(
        &mut self,
        outcome: Result<ClinicalOutput, Vec<ValidationIssue>>,
    ) -> PipelineResult<()> {
        self.expect_stage(PipelineStage::Generated, "validation")?;
        match outcome {
            Ok(output) => {
                self.parsed_output = Some(output);
                self.errors.clear();
            }
            Err(issues) => {
                self.parsed_output = None;
                self.errors = issues;
            }
        }
        self.stage = PipelineStage::Validated;
        Ok(())
    }

    fn expect_stage(&self, expected: PipelineStage, stage_name: &str) -> PipelineResult<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(PipelineError::StateMachineError {
                reason: format!(
                    "{stage_name} stage requires state in {expected:?}, found {:?} for '{}'",
                    self.stage, self.filename
                ),
            })
        }
    }
}
