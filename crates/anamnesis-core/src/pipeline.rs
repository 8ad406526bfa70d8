//! The per-item pipeline: a linear two-stage state machine.
//!
//!   Created ─[generation]→ Generated ─[validation]→ Validated
//!
//! Generation renders the prompt for the item and asks the `ModelInvoker`
//! for a response. Validation hands that response to the `OutputValidator`.
//! There is no branching and no way back: each `step()` applies exactly the
//! stage that follows the current one, and a terminal state rejects further
//! steps.

use tracing::{debug, warn};

use anamnesis_contracts::{
    error::{PipelineError, PipelineResult},
    state::{PipelineStage, PipelineState},
};

use crate::{
    invoker::ModelInvoker,
    prompt::render_prompt,
    traits::{OutputValidator, PromptSource},
};

/// Drives one `PipelineState` from `Created` to `Validated`.
///
/// The pipeline owns its collaborators and holds no per-item data, so one
/// instance serves a whole batch.
pub struct Pipeline {
    prompts: Box<dyn PromptSource>,
    invoker: ModelInvoker,
    validator: Box<dyn OutputValidator>,
}

impl Pipeline {
    pub fn new(
        prompts: Box<dyn PromptSource>,
        invoker: ModelInvoker,
        validator: Box<dyn OutputValidator>,
    ) -> Self {
        Self {
            prompts,
            invoker,
            validator,
        }
    }

    /// Run every remaining stage and return the terminal state.
    pub fn run(&self, mut state: PipelineState) -> PipelineResult<PipelineState> {
        while !state.stage().is_terminal() {
            self.step(&mut state)?;
        }
        Ok(state)
    }

    /// Apply the single stage that follows the current one.
    ///
    /// Returns the stage the state is in afterwards.
    ///
    /// # Errors
    ///
    /// `StateMachineError` if the state is already terminal.
    pub fn step(&self, state: &mut PipelineState) -> PipelineResult<PipelineStage> {
        match state.stage() {
            PipelineStage::Created => self.generate(state)?,
            PipelineStage::Generated => self.validate(state)?,
            PipelineStage::Validated => {
                return Err(PipelineError::StateMachineError {
                    reason: format!(
                        "'{}' is already validated; no stage follows",
                        state.filename()
                    ),
                });
            }
        }
        Ok(state.stage())
    }

    // ── Stages ───────────────────────────────────────────────────────────────

    fn generate(&self, state: &mut PipelineState) -> PipelineResult<()> {
        debug!(
            file = %state.filename(),
            prompt_version = %state.prompt_version(),
            "stage: generation"
        );

        let template = self.prompts.load_prompt(state.prompt_version());
        let prompt = render_prompt(&template, state.input_text());
        let raw = self.invoker.invoke(&prompt);

        state.record_generation(Some(raw))
    }

    fn validate(&self, state: &mut PipelineState) -> PipelineResult<()> {
        debug!(file = %state.filename(), "stage: validation");

        // A missing response is validated as empty text, which fails to parse.
        let raw = state.raw_response().unwrap_or("");
        let outcome = self.validator.validate(raw);

        if let Err(issues) = &outcome {
            warn!(
                file = %state.filename(),
                issue_count = issues.len(),
                "model response failed validation"
            );
        }

        state.record_validation(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anamnesis_contracts::{
        error::{PipelineError, PipelineResult},
        issue::{IssueKind, ValidationIssue},
        output::{ClinicalOutput, ClinicalReport, RiskAssessment, RiskLevel},
        state::{PipelineStage, PipelineState},
    };

    use crate::{
        invoker::{InvokerConfig, ModelInvoker, FALLBACK_RESPONSE},
        traits::{CompletionRequest, ModelClient, OutputValidator, PromptSource},
    };

    use super::Pipeline;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    struct FixedPrompt(&'static str);

    impl PromptSource for FixedPrompt {
        fn load_prompt(&self, _version: &str) -> String {
            self.0.to_string()
        }
    }

    /// A model that echoes the prompt it received, or fails.
    struct EchoModel {
        fail: bool,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ModelClient for EchoModel {
        fn complete(&self, request: &CompletionRequest<'_>) -> PipelineResult<String> {
            self.prompts.lock().unwrap().push(request.user_prompt.to_string());
            if self.fail {
                Err(PipelineError::ModelInvocationFailed {
                    reason: "connection refused".to_string(),
                })
            } else {
                Ok(request.user_prompt.to_string())
            }
        }
    }

    /// Accepts exactly the text "GOOD"; records what it was asked to check.
    struct MockValidator {
        seen: Arc<Mutex<Vec<String>>>,
    }

    fn sample_output() -> ClinicalOutput {
        ClinicalOutput {
            analysis: "a".to_string(),
            themes: vec![],
            signifiers: vec![],
            hypotheses: vec![],
            questions: vec![],
            risk_assessment: RiskAssessment {
                level: RiskLevel::Low,
                signals: vec![],
            },
            clinical_report: ClinicalReport {
                required: false,
                summary: String::new(),
            },
        }
    }

    impl OutputValidator for MockValidator {
        fn validate(&self, raw: &str) -> Result<ClinicalOutput, Vec<ValidationIssue>> {
            self.seen.lock().unwrap().push(raw.to_string());
            if raw == "GOOD" || raw == FALLBACK_RESPONSE {
                Ok(sample_output())
            } else {
                Err(vec![
                    ValidationIssue::field(Some("themes".into()), "too few items"),
                    ValidationIssue::field(Some("questions".into()), "too few items"),
                ])
            }
        }
    }

    struct Harness {
        pipeline: Pipeline,
        prompts: Arc<Mutex<Vec<String>>>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    fn harness(template: &'static str, fail_model: bool) -> Harness {
        let prompts = Arc::new(Mutex::new(vec![]));
        let seen = Arc::new(Mutex::new(vec![]));
        let pipeline = Pipeline::new(
            Box::new(FixedPrompt(template)),
            ModelInvoker::new(
                Box::new(EchoModel {
                    fail: fail_model,
                    prompts: prompts.clone(),
                }),
                InvokerConfig::default(),
            ),
            Box::new(MockValidator { seen: seen.clone() }),
        );
        Harness {
            pipeline,
            prompts,
            seen,
        }
    }

    // ── Test cases ───────────────────────────────────────────────────────────

    #[test]
    fn test_run_reaches_terminal_state_with_output() {
        let h = harness("{INPUT}", false);
        let state = h
            .pipeline
            .run(PipelineState::new("a.txt", "GOOD", "v1"))
            .unwrap();

        assert_eq!(state.stage(), PipelineStage::Validated);
        assert_eq!(state.raw_response(), Some("GOOD"));
        assert!(state.parsed_output().is_some());
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_prompt_is_rendered_from_template_and_input() {
        let h = harness("Texto: {INPUT}", false);
        h.pipeline
            .run(PipelineState::new("a.txt", "Eu sempre chego atrasado.", "v1"))
            .unwrap();

        assert_eq!(
            h.prompts.lock().unwrap().as_slice(),
            ["Texto: Eu sempre chego atrasado.".to_string()]
        );
    }

    #[test]
    fn test_validation_issues_are_all_recorded() {
        let h = harness("{INPUT}", false);
        let state = h
            .pipeline
            .run(PipelineState::new("b.txt", "BAD", "v1"))
            .unwrap();

        assert!(state.parsed_output().is_none());
        assert_eq!(state.errors().len(), 2);
        assert!(state
            .errors()
            .iter()
            .all(|i| i.kind == IssueKind::FieldValidationError));
        // Fields untouched by the stages are carried through.
        assert_eq!(state.input_text(), "BAD");
        assert_eq!(state.raw_response(), Some("BAD"));
    }

    #[test]
    fn test_model_failure_validates_fallback_payload() {
        let h = harness("{INPUT}", true);
        let state = h
            .pipeline
            .run(PipelineState::new("c.txt", "anything", "v1"))
            .unwrap();

        assert_eq!(state.raw_response(), Some(FALLBACK_RESPONSE));
        assert!(state.parsed_output().is_some());
        assert_eq!(h.seen.lock().unwrap().as_slice(), [FALLBACK_RESPONSE.to_string()]);
    }

    #[test]
    fn test_step_applies_one_stage_at_a_time() {
        let h = harness("{INPUT}", false);
        let mut state = PipelineState::new("d.txt", "GOOD", "v1");

        assert_eq!(h.pipeline.step(&mut state).unwrap(), PipelineStage::Generated);
        assert!(h.seen.lock().unwrap().is_empty(), "validator not called yet");

        assert_eq!(h.pipeline.step(&mut state).unwrap(), PipelineStage::Validated);
        assert_eq!(h.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_step_on_terminal_state_is_an_error() {
        let h = harness("{INPUT}", false);
        let mut state = h
            .pipeline
            .run(PipelineState::new("e.txt", "GOOD", "v1"))
            .unwrap();

        match h.pipeline.step(&mut state) {
            Err(PipelineError::StateMachineError { reason }) => {
                assert!(reason.contains("e.txt"));
            }
            other => panic!("expected StateMachineError, got {:?}", other),
        }
        assert_eq!(h.prompts.lock().unwrap().len(), 1, "generation never re-runs");
    }

    #[test]
    fn test_absent_raw_response_is_validated_as_empty_text() {
        let h = harness("{INPUT}", false);
        let mut state = PipelineState::new("f.txt", "GOOD", "v1");
        state.record_generation(None).unwrap();

        let state = h.pipeline.run(state).unwrap();

        assert_eq!(h.seen.lock().unwrap().as_slice(), [String::new()]);
        assert!(state.parsed_output().is_none());
        assert!(!state.errors().is_empty());
    }
}
