//! Output verification schema and report types.
//!
//! A raw model response is checked against an `OutputSchema` before it is
//! allowed to become a typed `ClinicalOutput`. Only a passing
//! `VerificationReport` lets the value through.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The full specification a payload is checked against.
///
/// Combines a JSON Schema document for structural typing with declarative
/// rules for constraints that are easier to state per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Unique identifier for this schema (e.g. "clinical-output-v1").
    pub schema_id: String,
    /// A JSON Schema document used for structural validation. `Null` skips
    /// the structural phase.
    pub json_schema: Value,
    /// Field rules, in field-declaration order.
    pub rules: Vec<VerificationRule>,
}

/// A single verification rule applied to a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRule {
    /// Unique identifier for this rule, referenced in failure reports.
    pub rule_id: String,
    /// Human-readable description for logs and tooling.
    pub description: String,
    pub rule_type: VerificationRuleType,
}

impl VerificationRule {
    /// The dotted field path this rule inspects.
    pub fn field_path(&self) -> &str {
        match &self.rule_type {
            VerificationRuleType::RequiredField { field_path }
            | VerificationRuleType::AllowedValues { field_path, .. }
            | VerificationRuleType::Cardinality { field_path, .. }
            | VerificationRuleType::WordCount { field_path, .. } => field_path,
        }
    }
}

/// The kinds of verification checks the verifier supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationRuleType {
    /// The field at `field_path` must be present and non-null.
    RequiredField {
        /// Dotted path, e.g. "clinical_report.summary".
        field_path: String,
    },

    /// The field at `field_path` must equal one of `allowed` exactly.
    AllowedValues {
        field_path: String,
        /// The exhaustive list of permitted values.
        allowed: Vec<Value>,
    },

    /// The array at `field_path` must hold between `min` and `max` items.
    Cardinality {
        field_path: String,
        min: usize,
        max: usize,
    },

    /// The string at `field_path` must hold between `min` and `max`
    /// whitespace-separated words.
    WordCount {
        field_path: String,
        min: usize,
        max: usize,
    },
}

/// The result of running an `OutputSchema` against a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if every check passed.
    pub passed: bool,
    /// All failures, in field-declaration order. Empty on pass.
    pub failures: Vec<VerificationFailure>,
}

/// A single failure within a `VerificationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// The `rule_id` of the failing rule, or "json-schema" for structural
    /// failures.
    pub rule_id: String,
    /// Dotted path of the offending field; empty for the document root.
    pub field_path: String,
    /// Human-readable explanation of why the check failed.
    pub message: String,
}
