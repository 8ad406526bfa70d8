//! Prompt templates read from `<dir>/prompt_<version>.txt`.

use std::{fs, path::PathBuf};

use tracing::{debug, warn};

use anamnesis_core::{
    prompt::{is_renderable, DEFAULT_PROMPT_TEMPLATE},
    traits::PromptSource,
};

/// Loads versioned prompt templates from a directory.
///
/// Any template that cannot be used resolves to the built-in default, so a
/// run never stops for a missing prompt.
#[derive(Debug, Clone)]
pub struct FilePromptSource {
    dir: PathBuf,
}

impl FilePromptSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the template for `version`.
    pub fn template_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("prompt_{version}.txt"))
    }
}

impl PromptSource for FilePromptSource {
    fn load_prompt(&self, version: &str) -> String {
        let path = self.template_path(version);
        match fs::read_to_string(&path) {
            Ok(template) if is_renderable(&template) => {
                debug!(path = %path.display(), version, "loaded prompt template");
                template
            }
            Ok(_) => {
                warn!(path = %path.display(), version, "template has no input placeholder; using default");
                DEFAULT_PROMPT_TEMPLATE.to_string()
            }
            Err(e) => {
                warn!(path = %path.display(), version, error = %e, "template unavailable; using default");
                DEFAULT_PROMPT_TEMPLATE.to_string()
            }
        }
    }
}
