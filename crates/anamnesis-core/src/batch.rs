//! The batch runner: drives the pipeline over every input and aggregates.
//!
//! Items are processed one at a time, in input order, each with a fresh
//! `PipelineState`. The runner is the outermost safety net: an `Err` from
//! the pipeline or a panic inside any collaborator is turned into a
//! `RuntimeFault` result for that item and the batch moves on. `run()`
//! always returns a complete `RunReport`.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info, info_span};
use uuid::Uuid;

use anamnesis_contracts::{
    error::PipelineResult,
    report::{ItemResult, RunReport},
    state::{InputItem, PipelineState},
};

use crate::{pipeline::Pipeline, traits::ReportSink};

/// Runs a whole batch and hands the report to a sink.
pub struct BatchRunner {
    pipeline: Pipeline,
    sink: Box<dyn ReportSink>,
}

impl BatchRunner {
    pub fn new(pipeline: Pipeline, sink: Box<dyn ReportSink>) -> Self {
        Self { pipeline, sink }
    }

    /// Process every item, persist the report, and return it.
    ///
    /// A sink failure is logged and does not change the returned report.
    /// Callers that must know whether the report was written use
    /// `process` followed by `persist`.
    pub fn run(&self, items: Vec<InputItem>, prompt_version: &str) -> RunReport {
        let report = self.process(items, prompt_version);
        // Already logged.
        let _ = self.persist(&report);
        report
    }

    /// Hand the report to the sink.
    ///
    /// # Errors
    ///
    /// Whatever the sink returned, typically `ReportWriteFailed`.
    pub fn persist(&self, report: &RunReport) -> PipelineResult<()> {
        self.sink.save(report).inspect_err(|e| {
            error!(error = %e, "failed to persist run report");
        })
    }

    /// Process every item and aggregate, without persisting.
    pub fn process(&self, items: Vec<InputItem>, prompt_version: &str) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch", %run_id, prompt_version);
        let _guard = span.enter();

        info!(total = items.len(), "starting batch");

        let results: Vec<ItemResult> = items
            .into_iter()
            .map(|item| self.run_item(item, prompt_version))
            .collect();

        let report = RunReport::from_results(prompt_version, results);
        info!(
            total = report.total,
            ok = report.metrics.ok,
            failed = report.metrics.failed,
            "batch complete"
        );
        report
    }

    /// Run one item in isolation.
    pub fn run_item(&self, item: InputItem, prompt_version: &str) -> ItemResult {
        let file = item.filename.clone();
        let state = PipelineState::new(item.filename, item.content, prompt_version);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.pipeline.run(state)));

        match outcome {
            Ok(Ok(final_state)) => ItemResult::from_state(&final_state),
            Ok(Err(e)) => {
                error!(file = %file, error = %e, "pipeline error, item isolated");
                ItemResult::runtime_fault(file, e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(file = %file, panic = %message, "pipeline panicked, item isolated");
                ItemResult::runtime_fault(file, message)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
