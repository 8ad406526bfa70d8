//! # anamnesis-store
//!
//! Filesystem-backed collaborators for the anamnesis pipeline:
//!
//! - [`input::DirectoryInputSource`]: `*.txt` notes of one directory
//! - [`prompt::FilePromptSource`]: versioned prompt templates
//! - [`sink::JsonReportSink`] and [`sink::InMemoryReportSink`]: report sinks

pub mod input;
pub mod prompt;
pub mod sink;

pub use input::DirectoryInputSource;
pub use prompt::FilePromptSource;
pub use sink::{InMemoryReportSink, JsonReportSink};
