//! Directory-backed input discovery.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use anamnesis_contracts::{
    error::{PipelineError, PipelineResult},
    state::InputItem,
};
use anamnesis_core::traits::InputSource;

/// File name of the note written into a freshly created input directory.
pub const SAMPLE_INPUT_NAME: &str = "exemplo_paciente.txt";

/// Content of the seeded sample note.
pub const SAMPLE_INPUT_TEXT: &str =
    "Eu sempre chego atrasado. Parece que faço isso de propósito. Quando chego, fico em silêncio.";

/// Lists the `*.txt` notes of one directory, sorted by file name.
#[derive(Debug, Clone)]
pub struct DirectoryInputSource {
    dir: PathBuf,
    seed_sample: bool,
}

impl DirectoryInputSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seed_sample: false,
        }
    }

    /// When the directory does not exist, create it with one sample note.
    pub fn with_sample_seeding(mut self, enabled: bool) -> Self {
        self.seed_sample = enabled;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn seed(&self) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| unavailable(&self.dir, e))?;
        let sample = self.dir.join(SAMPLE_INPUT_NAME);
        fs::write(&sample, SAMPLE_INPUT_TEXT).map_err(|e| unavailable(&sample, e))?;
        info!(path = %sample.display(), "seeded input directory with sample note");
        Ok(())
    }
}

impl InputSource for DirectoryInputSource {
    fn list_inputs(&self) -> PipelineResult<Vec<InputItem>> {
        if !self.dir.exists() {
            if !self.seed_sample {
                debug!(dir = %self.dir.display(), "input directory missing; nothing to process");
                return Ok(Vec::new());
            }
            self.seed()?;
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(|e| unavailable(&self.dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut items = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path).map_err(|e| unavailable(&path, e))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            items.push(InputItem::new(filename, content));
        }

        debug!(dir = %self.dir.display(), count = items.len(), "discovered inputs");
        Ok(items)
    }
}

fn unavailable(path: &Path, e: std::io::Error) -> PipelineError {
    PipelineError::InputUnavailable {
        reason: format!("'{}': {}", path.display(), e),
    }
}
