//! Report sinks.
//!
//! `JsonReportSink` writes the report as pretty-printed UTF-8 JSON.
//! `InMemoryReportSink` keeps every saved report behind an `Arc<Mutex<_>>`
//! so a clone held by the caller can inspect what the runner persisted.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::info;

use anamnesis_contracts::{
    error::{PipelineError, PipelineResult},
    report::RunReport,
};
use anamnesis_core::traits::ReportSink;

/// Writes the run report to one JSON file, replacing any previous content.
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonReportSink {
    fn save(&self, report: &RunReport) -> PipelineResult<()> {
        let body = serde_json::to_string_pretty(report).map_err(|e| PipelineError::ReportWriteFailed {
            reason: format!("failed to serialize report: {}", e),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
        }
        fs::write(&self.path, body).map_err(|e| write_failed(&self.path, e))?;

        info!(path = %self.path.display(), total = report.total, "report written");
        Ok(())
    }
}

fn write_failed(path: &Path, e: std::io::Error) -> PipelineError {
    PipelineError::ReportWriteFailed {
        reason: format!("'{}': {}", path.display(), e),
    }
}

/// Keeps saved reports in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportSink {
    reports: Arc<Mutex<Vec<RunReport>>>,
}

impl InMemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report saved so far, oldest first.
    pub fn reports(&self) -> Vec<RunReport> {
        self.reports
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// The most recently saved report.
    pub fn last(&self) -> Option<RunReport> {
        self.reports().pop()
    }
}

impl ReportSink for InMemoryReportSink {
    fn save(&self, report: &RunReport) -> PipelineResult<()> {
        let mut guard = self.reports.lock().map_err(|_| PipelineError::ReportWriteFailed {
            reason: "in-memory report store mutex poisoned".to_string(),
        })?;
        guard.push(report.clone());
        Ok(())
    }
}
