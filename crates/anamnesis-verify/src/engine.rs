//! Schema-based payload verifier.
//!
//! Verification runs in two phases:
//!
//! 1. **Structural**: the payload is validated against
//!    `OutputSchema::json_schema` using the `jsonschema` crate.
//! 2. **Rules**: each `VerificationRule` in `OutputSchema::rules` is
//!    evaluated in order.
//!
//! Nothing short-circuits: every failure from both phases is collected, then
//! the list is stably ordered by the declaration position of the rule that
//! owns each failing field, so operators read the failures in the same order
//! as the schema declares its fields.

use serde_json::Value;
use tracing::{debug, warn};

use anamnesis_contracts::{
    error::{PipelineError, PipelineResult},
    output::word_count,
    verify::{OutputSchema, VerificationFailure, VerificationReport, VerificationRuleType},
};

/// Rule id used for failures from the structural phase.
pub const JSON_SCHEMA_RULE_ID: &str = "json-schema";

/// The payload verifier. Stateless; one instance can check any schema.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaVerifier;

impl SchemaVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify `payload` against `schema`.
    ///
    /// # Errors
    ///
    /// `SchemaCompilation` if `schema.json_schema` is not a valid JSON Schema
    /// document. Payload problems are never errors; they are failures in the
    /// returned report.
    pub fn verify(&self, payload: &Value, schema: &OutputSchema) -> PipelineResult<VerificationReport> {
        let mut failures: Vec<VerificationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        if !schema.json_schema.is_null() {
            let validator = jsonschema::validator_for(&schema.json_schema).map_err(|e| {
                PipelineError::SchemaCompilation {
                    reason: format!("schema '{}': {}", schema.schema_id, e),
                }
            })?;

            for error in validator.iter_errors(payload) {
                let field_path = pointer_to_dotted(&error.instance_path.to_string());
                let message = error.to_string();
                warn!(schema_id = %schema.schema_id, field = %field_path, %message, "structural validation failure");
                failures.push(VerificationFailure {
                    rule_id: JSON_SCHEMA_RULE_ID.to_string(),
                    field_path,
                    message,
                });
            }
        }

        // ── Phase 2: Rule evaluation ──────────────────────────────────────────
        for rule in &schema.rules {
            debug!(
                rule_id = %rule.rule_id,
                description = %rule.description,
                "evaluating verification rule"
            );

            let failure_msg: Option<String> = match &rule.rule_type {
                // ── RequiredField ─────────────────────────────────────────────
                VerificationRuleType::RequiredField { field_path } => {
                    if resolve_path(payload, field_path).is_none() {
                        Some("field required".to_string())
                    } else {
                        None
                    }
                }

                // ── AllowedValues ─────────────────────────────────────────────
                // Exact JSON equality, so string matching is case-sensitive.
                VerificationRuleType::AllowedValues { field_path, allowed } => {
                    match resolve_path(payload, field_path) {
                        None => Some("field required".to_string()),
                        Some(actual) if allowed.contains(actual) => None,
                        Some(actual) => Some(format!(
                            "value {actual} is not one of {}",
                            render_allowed(allowed)
                        )),
                    }
                }

                // ── Cardinality ───────────────────────────────────────────────
                // Non-array values are the structural phase's business.
                VerificationRuleType::Cardinality { field_path, min, max } => {
                    match resolve_path(payload, field_path) {
                        None => Some("field required".to_string()),
                        Some(Value::Array(items)) => check_bounds(items.len(), *min, *max, "items"),
                        Some(_) => None,
                    }
                }

                // ── WordCount ─────────────────────────────────────────────────
                VerificationRuleType::WordCount { field_path, min, max } => {
                    match resolve_path(payload, field_path) {
                        None => Some("field required".to_string()),
                        Some(Value::String(text)) => check_bounds(word_count(text), *min, *max, "words"),
                        Some(_) => None,
                    }
                }
            };

            if let Some(message) = failure_msg {
                warn!(rule_id = %rule.rule_id, %message, "rule failed");
                failures.push(VerificationFailure {
                    rule_id: rule.rule_id.clone(),
                    field_path: rule.field_path().to_string(),
                    message,
                });
            }
        }

        // Stable sort keeps structural failures ahead of rule failures for
        // the same field.
        failures.sort_by_key(|f| declaration_rank(schema, &f.field_path));

        let passed = failures.is_empty();
        debug!(
            schema_id = %schema.schema_id,
            passed,
            failure_count = failures.len(),
            "verification complete"
        );

        Ok(VerificationReport { passed, failures })
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Resolve a dot-notation field path against a JSON value. Returns `None`
/// when any segment is missing or the value is JSON `null`.
fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}

/// `/risk_assessment/level` → `risk_assessment.level`; the root is `""`.
fn pointer_to_dotted(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn check_bounds(count: usize, min: usize, max: usize, unit: &str) -> Option<String> {
    if count < min {
        Some(format!("expected at least {min} {unit}, got {count}"))
    } else if count > max {
        Some(format!("expected at most {max} {unit}, got {count}"))
    } else {
        None
    }
}

fn render_allowed(allowed: &[Value]) -> String {
    allowed
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Position of the first rule related to `field_path`.
///
/// A rule is related when its path equals the failure path, is nested
/// under it, or contains it. The document root ranks first; failures no rule
/// owns rank last.
fn declaration_rank(schema: &OutputSchema, field_path: &str) -> usize {
    if field_path.is_empty() {
        return 0;
    }
    let related = |rule_path: &str| {
        rule_path == field_path
            || rule_path.starts_with(&format!("{field_path}."))
            || field_path.starts_with(&format!("{rule_path}."))
    };
    schema
        .rules
        .iter()
        .position(|rule| related(rule.field_path()))
        .unwrap_or(schema.rules.len())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use anamnesis_contracts::{
        error::PipelineError,
        verify::{OutputSchema, VerificationRule, VerificationRuleType},
    };

    use super::{pointer_to_dotted, SchemaVerifier, JSON_SCHEMA_RULE_ID};

    // ── Builder helpers ───────────────────────────────────────────────────────

    fn make_schema(json_schema: serde_json::Value, rules: Vec<VerificationRule>) -> OutputSchema {
        OutputSchema {
            schema_id: "test-schema-v1".to_string(),
            json_schema,
            rules,
        }
    }

    fn rule(id: &str, rule_type: VerificationRuleType) -> VerificationRule {
        VerificationRule {
            rule_id: id.to_string(),
            description: format!("{id} description"),
            rule_type,
        }
    }

    fn cardinality(path: &str, min: usize, max: usize) -> VerificationRuleType {
        VerificationRuleType::Cardinality {
            field_path: path.to_string(),
            min,
            max,
        }
    }

    // ── JSON Schema tests ─────────────────────────────────────────────────────

    #[test]
    fn test_schema_pass() {
        let schema = make_schema(
            json!({
                "type": "object",
                "properties": { "status": { "type": "string" } }
            }),
            vec![],
        );

        let report = SchemaVerifier::new().verify(&json!({ "status": "ok" }), &schema).unwrap();

        assert!(report.passed, "expected pass, failures: {:?}", report.failures);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_schema_type_failure_carries_dotted_path() {
        let schema = make_schema(
            json!({
                "type": "object",
                "properties": {
                    "risk": {
                        "type": "object",
                        "properties": { "level": { "type": "string" } }
                    }
                }
            }),
            vec![],
        );

        let report = SchemaVerifier::new()
            .verify(&json!({ "risk": { "level": 3 } }), &schema)
            .unwrap();

        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].rule_id, JSON_SCHEMA_RULE_ID);
        assert_eq!(report.failures[0].field_path, "risk.level");
    }

    #[test]
    fn test_invalid_schema_document_is_an_error() {
        let schema = make_schema(json!({ "type": 12 }), vec![]);
        let result = SchemaVerifier::new().verify(&json!({}), &schema);
        assert!(matches!(result, Err(PipelineError::SchemaCompilation { .. })));
    }

    // ── RequiredField / AllowedValues ─────────────────────────────────────────

    #[test]
    fn test_required_field_treats_null_as_missing() {
        let schema = make_schema(
            serde_json::Value::Null,
            vec![rule(
                "req-summary",
                VerificationRuleType::RequiredField {
                    field_path: "report.summary".to_string(),
                },
            )],
        );

        let verifier = SchemaVerifier::new();
        assert!(verifier.verify(&json!({ "report": { "summary": "s" } }), &schema).unwrap().passed);

        let report = verifier
            .verify(&json!({ "report": { "summary": null } }), &schema)
            .unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures[0].rule_id, "req-summary");
        assert_eq!(report.failures[0].field_path, "report.summary");
    }

    #[test]
    fn test_required_field_accepts_false() {
        let schema = make_schema(
            serde_json::Value::Null,
            vec![rule(
                "req-flag",
                VerificationRuleType::RequiredField {
                    field_path: "flag".to_string(),
                },
            )],
        );
        assert!(SchemaVerifier::new().verify(&json!({ "flag": false }), &schema).unwrap().passed);
    }

    #[test]
    fn test_allowed_values_is_case_sensitive() {
        let schema = make_schema(
            serde_json::Value::Null,
            vec![rule(
                "allowed-level",
                VerificationRuleType::AllowedValues {
                    field_path: "level".to_string(),
                    allowed: vec![json!("baixo"), json!("médio"), json!("alto")],
                },
            )],
        );
        let verifier = SchemaVerifier::new();

        assert!(verifier.verify(&json!({ "level": "médio" }), &schema).unwrap().passed);

        let report = verifier.verify(&json!({ "level": "Alto" }), &schema).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("\"Alto\""));

        let report = verifier.verify(&json!({ "level": "medio" }), &schema).unwrap();
        assert!(!report.passed, "accent-less spelling is not accepted");
    }

    // ── Cardinality / WordCount ───────────────────────────────────────────────

    #[test]
    fn test_cardinality_bounds_are_inclusive() {
        let schema = make_schema(serde_json::Value::Null, vec![rule("themes", cardinality("themes", 3, 6))]);
        let verifier = SchemaVerifier::new();

        for (len, ok) in [(2, false), (3, true), (6, true), (7, false)] {
            let payload = json!({ "themes": vec!["t"; len] });
            let report = verifier.verify(&payload, &schema).unwrap();
            assert_eq!(report.passed, ok, "length {len}");
        }
    }

    #[test]
    fn test_cardinality_missing_field_fails() {
        let schema = make_schema(serde_json::Value::Null, vec![rule("themes", cardinality("themes", 3, 6))]);
        let report = SchemaVerifier::new().verify(&json!({}), &schema).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures[0].message, "field required");
    }

    #[test]
    fn test_word_count_messages() {
        let schema = make_schema(
            serde_json::Value::Null,
            vec![rule(
                "analysis-words",
                VerificationRuleType::WordCount {
                    field_path: "analysis".to_string(),
                    min: 2,
                    max: 3,
                },
            )],
        );
        let verifier = SchemaVerifier::new();

        let report = verifier.verify(&json!({ "analysis": "one" }), &schema).unwrap();
        assert_eq!(report.failures[0].message, "expected at least 2 words, got 1");

        let report = verifier.verify(&json!({ "analysis": "a b c d" }), &schema).unwrap();
        assert_eq!(report.failures[0].message, "expected at most 3 words, got 4");

        assert!(verifier.verify(&json!({ "analysis": " a \n b " }), &schema).unwrap().passed);
    }

    // ── Collection and ordering ───────────────────────────────────────────────

    #[test]
    fn test_all_failures_collected_in_declaration_order() {
        let schema = make_schema(
            json!({
                "type": "object",
                "properties": {
                    "first": { "type": "array", "items": { "type": "string" } },
                    "second": { "type": "array", "items": { "type": "string" } }
                }
            }),
            vec![
                rule("first", cardinality("first", 1, 2)),
                rule("second", cardinality("second", 1, 2)),
            ],
        );

        // "second" has a structural failure (item type) discovered in phase 1,
        // "first" only a rule failure discovered in phase 2.
        let payload = json!({ "first": [], "second": [1] });
        let report = SchemaVerifier::new().verify(&payload, &schema).unwrap();

        let paths: Vec<&str> = report.failures.iter().map(|f| f.field_path.as_str()).collect();
        assert_eq!(paths, ["first", "second.0"]);
    }

    #[test]
    fn test_pointer_conversion() {
        assert_eq!(pointer_to_dotted(""), "");
        assert_eq!(pointer_to_dotted("/themes/2"), "themes.2");
        assert_eq!(pointer_to_dotted("/a~1b"), "a/b");
    }
}
