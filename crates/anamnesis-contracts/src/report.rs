//! Per-item results and the consolidated run report.
//!
//! `ItemResult` is what survives of a `PipelineState` once its run is over.
//! `RunReport` is the persisted document; its serialized form contains
//! exactly the fields declared here, with `output: null` for failed items.

use serde::{Deserialize, Serialize};

use crate::{issue::ValidationIssue, output::ClinicalOutput, state::PipelineState};

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub file: String,
    /// True iff `output` is present and `errors` is empty.
    pub ok: bool,
    pub errors: Vec<String>,
    pub output: Option<ClinicalOutput>,
}

impl ItemResult {
    /// Derive the result from a finished pipeline state.
    ///
    /// A state with both an output and issues is treated as failed and its
    /// output is dropped, so `ok` and `output` never disagree.
    pub fn from_state(state: &PipelineState) -> Self {
        let errors: Vec<String> = state.errors().iter().map(ToString::to_string).collect();
        let output = match state.parsed_output() {
            Some(output) if errors.is_empty() => Some(output.clone()),
            _ => None,
        };
        Self {
            file: state.filename().to_string(),
            ok: output.is_some(),
            errors,
            output,
        }
    }

    /// A result for an item whose processing broke outside the normal
    /// parse/validation paths.
    pub fn runtime_fault(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ok: false,
            errors: vec![ValidationIssue::runtime(message).to_string()],
            output: None,
        }
    }
}

/// Success/failure counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub ok: usize,
    pub failed: usize,
}

/// The consolidated report of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub prompt_version: String,
    pub total: usize,
    pub metrics: RunMetrics,
    /// Results in the exact order the inputs were supplied.
    pub results: Vec<ItemResult>,
}

impl RunReport {
    /// Build a report from ordered results, computing totals and metrics.
    pub fn from_results(prompt_version: impl Into<String>, results: Vec<ItemResult>) -> Self {
        let total = results.len();
        let ok = results.iter().filter(|r| r.ok).count();
        Self {
            prompt_version: prompt_version.into(),
            total,
            metrics: RunMetrics {
                ok,
                failed: total - ok,
            },
            results,
        }
    }

    /// One-line human-readable count summary.
    pub fn summary_line(&self) -> String {
        format!(
            "Success: {} | Failures: {}",
            self.metrics.ok, self.metrics.failed
        )
    }
}
