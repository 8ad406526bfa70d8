//! # anamnesis-verify
//!
//! Output verification for the anamnesis pipeline.
//!
//! [`engine::SchemaVerifier`] checks a JSON payload in two phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Rules**: `RequiredField`, `AllowedValues`, `Cardinality` and
//!    `WordCount`, evaluated against the payload.
//!
//! [`clinical::ClinicalValidator`] binds the verifier to the clinical output
//! contract and implements `anamnesis_core::traits::OutputValidator`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use anamnesis_core::traits::OutputValidator;
//! use anamnesis_verify::ClinicalValidator;
//!
//! match ClinicalValidator::new().validate(raw) {
//!     Ok(output) => println!("{} themes", output.themes.len()),
//!     Err(issues) => issues.iter().for_each(|i| println!("{i}")),
//! }
//! ```

pub mod clinical;
pub mod engine;

pub use clinical::{clinical_output_schema, ClinicalValidator};
pub use engine::SchemaVerifier;
