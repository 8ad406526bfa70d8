//! # anamnesis-config
//!
//! Run configuration loaded from TOML.
//!
//! Every field has a default, so an empty document is a complete
//! configuration:
//!
//! ```toml
//! prompt_version = "v2"
//!
//! [paths]
//! input_dir = "data/input"
//! prompts_dir = "prompts"
//! output_path = "results.json"
//! seed_sample_input = true
//!
//! [model]
//! api_base = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! temperature = 0.2
//! timeout_secs = 60
//! api_key_env = "OPENAI_API_KEY"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use anamnesis_contracts::error::{PipelineError, PipelineResult};
use anamnesis_core::invoker::{InvokerConfig, DEFAULT_SYSTEM_INSTRUCTION, DEFAULT_TEMPERATURE};

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Selects `prompt_<version>.txt` and is echoed into the report.
    pub prompt_version: String,
    pub paths: PathsSection,
    pub model: ModelSection,
}

/// Where inputs, prompts and the report live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub input_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub output_path: PathBuf,
    /// Create the input directory with a sample note when it is missing.
    pub seed_sample_input: bool,
}

/// External model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Base URL of an OpenAI-compatible API, without the trailing path.
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Name of the environment variable that holds the API key.
    pub api_key_env: String,
    pub system_instruction: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            prompt_version: "v2".to_string(),
            paths: PathsSection::default(),
            model: ModelSection::default(),
        }
    }
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/input"),
            prompts_dir: PathBuf::from("prompts"),
            output_path: PathBuf::from("results.json"),
            seed_sample_input: true,
        }
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: 60,
            api_key_env: "OPENAI_API_KEY".to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl RunConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `PipelineError::ConfigError` if the TOML is malformed, does
    /// not match `RunConfig`, or fails `validate()`.
    pub fn from_toml_str(s: &str) -> PipelineResult<Self> {
        let config: RunConfig = toml::from_str(s).map_err(|e| PipelineError::ConfigError {
            reason: format!("failed to parse run config TOML: {}", e),
        })?;
        config.validate()?;
        debug!(prompt_version = %config.prompt_version, model = %config.model.model, "run config loaded");
        Ok(config)
    }

    /// Read the file at `path` and parse it as a run configuration.
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PipelineError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check the values a run cannot work without.
    pub fn validate(&self) -> PipelineResult<()> {
        let invalid = |reason: &str| {
            Err(PipelineError::ConfigError {
                reason: reason.to_string(),
            })
        };

        if self.prompt_version.trim().is_empty() {
            return invalid("prompt_version must not be empty");
        }
        if self.model.model.trim().is_empty() {
            return invalid("model.model must not be empty");
        }
        if self.model.api_base.trim().is_empty() {
            return invalid("model.api_base must not be empty");
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(PipelineError::ConfigError {
                reason: format!(
                    "model.temperature must be within [0, 2], got {}",
                    self.model.temperature
                ),
            });
        }
        if self.model.timeout_secs == 0 {
            return invalid("model.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Request settings for the `ModelInvoker`.
    pub fn invoker_config(&self) -> InvokerConfig {
        InvokerConfig {
            system_instruction: self.model.system_instruction.clone(),
            temperature: self.model.temperature,
            json_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tempfile::TempDir;

    use anamnesis_contracts::error::PipelineError;
    use anamnesis_core::invoker::InvokerConfig;

    use super::RunConfig;

    // ── Parsing ──────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.prompt_version, "v2");
        assert_eq!(config.paths.input_dir, Path::new("data/input"));
        assert_eq!(config.paths.output_path, Path::new("results.json"));
        assert!(config.paths.seed_sample_input);
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.timeout_secs, 60);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = RunConfig::from_toml_str(
            r#"
            prompt_version = "v3"

            [model]
            model = "gpt-4o"
            temperature = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.prompt_version, "v3");
        assert_eq!(config.model.model, "gpt-4o");
        assert_eq!(config.model.temperature, 0.0);
        assert_eq!(config.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.paths.prompts_dir, Path::new("prompts"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = RunConfig::from_toml_str("prompt_version = ");
        assert!(matches!(result, Err(PipelineError::ConfigError { .. })));
    }

    #[test]
    fn test_wrong_value_type_is_config_error() {
        let result = RunConfig::from_toml_str("[model]\ntimeout_secs = \"soon\"");
        assert!(matches!(result, Err(PipelineError::ConfigError { .. })));
    }

    // ── Validation ───────────────────────────────────────────────────────────

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            ("prompt_version = \"\"", "prompt_version"),
            ("[model]\nmodel = \" \"", "model.model"),
            ("[model]\napi_base = \"\"", "model.api_base"),
            ("[model]\ntemperature = 2.5", "model.temperature"),
            ("[model]\ntemperature = -0.1", "model.temperature"),
            ("[model]\ntimeout_secs = 0", "model.timeout_secs"),
        ];
        for (toml, field) in cases {
            match RunConfig::from_toml_str(toml) {
                Err(PipelineError::ConfigError { reason }) => {
                    assert!(reason.contains(field), "{toml:?}: {reason}");
                }
                other => panic!("expected ConfigError for {toml:?}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_temperature_bounds_are_inclusive() {
        assert!(RunConfig::from_toml_str("[model]\ntemperature = 2.0").is_ok());
        assert!(RunConfig::from_toml_str("[model]\ntemperature = 0.0").is_ok());
    }

    // ── Files and derived settings ───────────────────────────────────────────

    #[test]
    fn test_from_file_reads_and_parses() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("anamnesis.toml");
        fs::write(&path, "[paths]\noutput_path = \"out/report.json\"").unwrap();

        let config = RunConfig::from_file(&path).unwrap();

        assert_eq!(config.paths.output_path, Path::new("out/report.json"));
    }

    #[test]
    fn test_from_file_missing_is_config_error() {
        let temp = TempDir::new().unwrap();
        let result = RunConfig::from_file(&temp.path().join("absent.toml"));
        match result {
            Err(PipelineError::ConfigError { reason }) => assert!(reason.contains("absent.toml")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_invoker_config_follows_model_section() {
        let config = RunConfig::from_toml_str(
            "[model]\ntemperature = 0.7\nsystem_instruction = \"Responda em JSON.\"",
        )
        .unwrap();

        assert_eq!(
            config.invoker_config(),
            InvokerConfig {
                system_instruction: "Responda em JSON.".to_string(),
                temperature: 0.7,
                json_output: true,
            }
        );
    }
}
