//! The clinical output contract and its validator.
//!
//! `clinical_output_schema()` declares the contract: JSON Schema for types,
//! then one rule per constrained field in declaration order. Cardinality and
//! enumeration violations are reported side by side in one flat list; none
//! is ranked above another.
//!
//! `ClinicalValidator` is the `OutputValidator` the pipeline uses: parse,
//! verify, and only then build the typed `ClinicalOutput`.

use serde_json::{json, Value};
use tracing::debug;

use anamnesis_contracts::{
    issue::ValidationIssue,
    output::{
        ClinicalOutput, RiskLevel, ANALYSIS_WORDS, HYPOTHESES_LEN, QUESTIONS_LEN, SIGNIFIERS_LEN,
        THEMES_LEN,
    },
    verify::{OutputSchema, VerificationRule, VerificationRuleType},
};
use anamnesis_core::traits::OutputValidator;

use crate::engine::SchemaVerifier;

/// Identifier of the clinical output schema.
pub const CLINICAL_SCHEMA_ID: &str = "clinical-output-v1";

/// Build the clinical output schema.
pub fn clinical_output_schema() -> OutputSchema {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    OutputSchema {
        schema_id: CLINICAL_SCHEMA_ID.to_string(),
        json_schema: json!({
            "type": "object",
            "properties": {
                "analysis": { "type": "string" },
                "themes": string_list,
                "signifiers": string_list,
                "hypotheses": string_list,
                "questions": string_list,
                "risk_assessment": {
                    "type": "object",
                    "properties": {
                        "level": { "type": "string" },
                        "signals": string_list
                    }
                },
                "clinical_report": {
                    "type": "object",
                    "properties": {
                        "required": { "type": "boolean" },
                        "summary": { "type": "string" }
                    }
                }
            }
        }),
        rules: vec![
            word_rule("analysis-length", "analysis", ANALYSIS_WORDS),
            cardinality_rule("themes-count", "themes", THEMES_LEN),
            cardinality_rule("signifiers-count", "signifiers", SIGNIFIERS_LEN),
            cardinality_rule("hypotheses-count", "hypotheses", HYPOTHESES_LEN),
            cardinality_rule("questions-count", "questions", QUESTIONS_LEN),
            VerificationRule {
                rule_id: "risk-level".to_string(),
                description: "Risk level must be baixo, médio or alto".to_string(),
                rule_type: VerificationRuleType::AllowedValues {
                    field_path: "risk_assessment.level".to_string(),
                    allowed: RiskLevel::WIRE_VALUES.iter().map(|v| json!(v)).collect(),
                },
            },
            required_rule("risk-signals", "risk_assessment.signals"),
            required_rule("report-required", "clinical_report.required"),
            required_rule("report-summary", "clinical_report.summary"),
        ],
    }
}

fn word_rule(id: &str, path: &str, (min, max): (usize, usize)) -> VerificationRule {
    VerificationRule {
        rule_id: id.to_string(),
        description: format!("{path} must contain {min}-{max} words"),
        rule_type: VerificationRuleType::WordCount {
            field_path: path.to_string(),
            min,
            max,
        },
    }
}

fn cardinality_rule(id: &str, path: &str, (min, max): (usize, usize)) -> VerificationRule {
    VerificationRule {
        rule_id: id.to_string(),
        description: format!("{path} must contain {min}-{max} items"),
        rule_type: VerificationRuleType::Cardinality {
            field_path: path.to_string(),
            min,
            max,
        },
    }
}

fn required_rule(id: &str, path: &str) -> VerificationRule {
    VerificationRule {
        rule_id: id.to_string(),
        description: format!("{path} must be present"),
        rule_type: VerificationRuleType::RequiredField {
            field_path: path.to_string(),
        },
    }
}

/// Validates raw model text against the clinical output contract.
pub struct ClinicalValidator {
    verifier: SchemaVerifier,
    schema: OutputSchema,
}

impl ClinicalValidator {
    pub fn new() -> Self {
        Self {
            verifier: SchemaVerifier::new(),
            schema: clinical_output_schema(),
        }
    }

    /// Validate an already-parsed document.
    pub fn validate_value(&self, value: Value) -> Result<ClinicalOutput, Vec<ValidationIssue>> {
        let report = self
            .verifier
            .verify(&value, &self.schema)
            .map_err(|e| vec![ValidationIssue::field(None, e.to_string())])?;

        if !report.passed {
            return Err(report
                .failures
                .into_iter()
                .map(|f| {
                    let path = (!f.field_path.is_empty()).then_some(f.field_path);
                    ValidationIssue::field(path, f.message)
                })
                .collect());
        }

        serde_json::from_value::<ClinicalOutput>(value)
            .map_err(|e| vec![ValidationIssue::field(None, e.to_string())])
    }
}

impl Default for ClinicalValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputValidator for ClinicalValidator {
    fn validate(&self, raw: &str) -> Result<ClinicalOutput, Vec<ValidationIssue>> {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            debug!(error = %e, "model response is not valid JSON");
            vec![ValidationIssue::parse(e.to_string())]
        })?;
        self.validate_value(value)
    }
}
