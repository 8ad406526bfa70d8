//! Tagged validation issues.
//!
//! Every problem found while turning a raw model response into a
//! `ClinicalOutput` is described by one `ValidationIssue`. Callers branch on
//! `kind` instead of parsing messages; the flat string form written to the
//! report comes from the `Display` impl.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// The raw response is not a well-formed JSON document.
    ParseError,
    /// A field violates a type, cardinality, range or enumeration constraint.
    FieldValidationError,
    /// An unexpected failure escaped the item's pipeline run.
    RuntimeFault,
}

/// A single problem attached to one input item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    /// Dotted path of the offending field (e.g. `risk_assessment.level`).
    /// `None` when the issue concerns the document as a whole.
    pub field_path: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::ParseError,
            field_path: None,
            message: message.into(),
        }
    }

    pub fn field(field_path: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::FieldValidationError,
            field_path,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::RuntimeFault,
            field_path: None,
            message: message.into(),
        }
    }

    /// True if this issue refers to `path` or to something nested below it.
    pub fn concerns(&self, path: &str) -> bool {
        match &self.field_path {
            Some(p) => p == path || p.starts_with(&format!("{path}.")),
            None => false,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::ParseError => write!(f, "Parse Error: {}", self.message),
            IssueKind::FieldValidationError => match &self.field_path {
                Some(path) if !path.is_empty() => {
                    write!(f, "Validation Error: {} at {}", self.message, path)
                }
                _ => write!(f, "Validation Error: {} at (root)", self.message),
            },
            IssueKind::RuntimeFault => write!(f, "Runtime Error: {}", self.message),
        }
    }
}
