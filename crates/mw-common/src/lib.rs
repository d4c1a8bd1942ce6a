//! Mowing evaluation common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Reference and predicted event records
//! - Submission identity and roll-up scopes
//! - Common error types
//! - Output format specifications

pub mod error;
pub mod event;
pub mod output;
pub mod scope;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use event::{PredictedEvent, ReferenceEvent, Submission};
pub use output::OutputFormat;
pub use scope::{Scope, ALL_LABEL};
