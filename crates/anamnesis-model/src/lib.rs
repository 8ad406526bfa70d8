//! # anamnesis-model
//!
//! `ModelClient` implementations:
//!
//! - [`openai::OpenAiChatClient`] talks to any OpenAI-compatible
//!   chat-completions endpoint over blocking HTTP.
//! - [`OfflineModelClient`] never reaches a model, so every item takes the
//!   fallback path.

pub mod openai;

use anamnesis_contracts::error::{PipelineError, PipelineResult};
use anamnesis_core::traits::{CompletionRequest, ModelClient};

pub use openai::OpenAiChatClient;

/// A model client that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineModelClient;

impl ModelClient for OfflineModelClient {
    fn complete(&self, _request: &CompletionRequest<'_>) -> PipelineResult<String> {
        Err(PipelineError::ModelInvocationFailed {
            reason: "offline mode: no model configured".to_string(),
        })
    }
}
