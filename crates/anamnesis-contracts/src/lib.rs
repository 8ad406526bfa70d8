//! # anamnesis-contracts
//!
//! Shared data model, issue and error types for the anamnesis pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions, the bookkeeping of the per-item
//! state machine and error types.

pub mod error;
pub mod issue;
pub mod output;
pub mod report;
pub mod state;
pub mod verify;
