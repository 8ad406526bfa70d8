//! # anamnesis-core
//!
//! The generation/validation pipeline for clinical notes.
//!
//! This crate provides:
//! - The collaborator traits (`InputSource`, `PromptSource`, `ModelClient`,
//!   `OutputValidator`, `ReportSink`)
//! - `ModelInvoker`, which calls the model once and falls back to a fixed,
//!   schema-valid payload on failure
//! - `Pipeline`, the two-stage per-item state machine
//! - `BatchRunner`, which isolates items from each other and aggregates the
//!   `RunReport`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use anamnesis_core::{BatchRunner, ModelInvoker, Pipeline, invoker::InvokerConfig};
//!
//! let pipeline = Pipeline::new(prompts, ModelInvoker::new(client, InvokerConfig::default()), validator);
//! let report = BatchRunner::new(pipeline, sink).run(items, "v2");
//! ```

pub mod batch;
pub mod invoker;
pub mod pipeline;
pub mod prompt;
pub mod traits;

pub use batch::BatchRunner;
pub use invoker::ModelInvoker;
pub use pipeline::Pipeline;
