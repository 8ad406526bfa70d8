//! Chat-completions client for OpenAI-compatible APIs.
//!
//! One blocking POST per call to `{api_base}/chat/completions`. The response
//! text is `choices[0].message.content`; everything else about the response
//! is ignored. Every failure is a `ModelInvocationFailed`, which the invoker
//! absorbs into the fallback path.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use anamnesis_config::ModelSection;
use anamnesis_contracts::error::{PipelineError, PipelineResult};
use anamnesis_core::traits::{CompletionRequest, ModelClient};

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn build_body<'a>(model: &'a str, request: &CompletionRequest<'a>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [
            ChatMessage {
                role: "system",
                content: request.system_instruction,
            },
            ChatMessage {
                role: "user",
                content: request.user_prompt,
            },
        ],
        temperature: request.temperature,
        response_format: request.json_output.then_some(ResponseFormat { kind: "json_object" }),
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response body.
pub fn extract_content(body: &str) -> PipelineResult<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| failed(format!("malformed chat-completions response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| failed("response carries no message content"))
}

fn failed(reason: impl Into<String>) -> PipelineError {
    PipelineError::ModelInvocationFailed {
        reason: reason.into(),
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Blocking client for `POST {api_base}/chat/completions`.
pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiChatClient {
    /// Build a client from the model section.
    ///
    /// The API key is read from the environment variable named by
    /// `api_key_env`. A missing key is not an error here; every call then
    /// fails and the invoker falls back.
    ///
    /// Returns `PipelineError::ConfigError` if the HTTP client cannot be built.
    pub fn new(section: &ModelSection) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs))
            .build()
            .map_err(|e| PipelineError::ConfigError {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        let api_key = std::env::var(&section.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            debug!(env = %section.api_key_env, "no API key in environment");
        }

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", section.api_base.trim_end_matches('/')),
            model: section.model.clone(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ModelClient for OpenAiChatClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> PipelineResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| failed("no API key configured"))?;

        debug!(endpoint = %self.endpoint, model = %self.model, "sending chat-completions request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&build_body(&self.model, request))
            .send()
            .map_err(|e| failed(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| failed(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(failed(format!("model API returned {}: {}", status.as_u16(), body)));
        }

        extract_content(&body)
    }
}
