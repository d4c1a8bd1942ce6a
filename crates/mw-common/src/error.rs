//! Error types for mowing evaluation.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Input Schema Violation
//!   Reason: reference.csv is missing required column(s): region
//!   Fix: Add the missing columns to the CSV header ...
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 20,
//!   "category": "input",
//!   "message": "reference.csv is missing required column(s): region",
//!   "remediation": "..."
//! }
//! ```
//!
//! Non-fatal conditions (malformed rows, undefined metrics) are not errors;
//! they travel as warnings inside the evaluation report.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mowing evaluation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file or parameter errors.
    Config,
    /// Input table errors (schema, CSV structure).
    Input,
    /// Evaluation pipeline errors.
    Evaluation,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Evaluation => write!(f, "evaluation"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for mowing evaluation.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    // Input errors (20-29)
    #[error("{} is missing required column(s): {}", .path.display(), .missing.join(", "))]
    SchemaViolation { path: PathBuf, missing: Vec<String> },

    #[error("CSV error in {}: {message}", .path.display())]
    Csv { path: PathBuf, message: String },

    // Evaluation errors (30-39)
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Evaluation errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidParameter { .. } => 11,
            Error::SchemaViolation { .. } => 20,
            Error::Csv { .. } => 21,
            Error::Evaluation(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidParameter { .. } => ErrorCategory::Config,
            Error::SchemaViolation { .. } | Error::Csv { .. } => ErrorCategory::Input,
            Error::Evaluation(_) => ErrorCategory::Evaluation,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Check the config file syntax, or run 'mw-eval config show' to see the resolved values."
            }
            Error::InvalidParameter { .. } => {
                "Fix the parameter value on the command line, in the environment, or in the config file."
            }
            Error::SchemaViolation { .. } => {
                "Add the missing columns to the CSV header. Run 'mw-eval schema' for the expected layout."
            }
            Error::Csv { .. } => {
                "The file is not readable as CSV. Check delimiters, quoting, and encoding (UTF-8)."
            }
            Error::Evaluation(_) => {
                "Internal evaluation failure. Re-run with -vv and report the log output."
            }
            Error::Io(_) => "Check that input files exist and the output directory is writable.",
            Error::Json(_) => "Failed to encode output as JSON. Re-run with -vv and report the log output.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::SchemaViolation { .. } => "Input Schema Violation",
            Error::Csv { .. } => "Unreadable CSV Input",
            Error::Evaluation(_) => "Evaluation Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "Serialization Error",
        }
    }

    /// Format the error for terminal display.
    pub fn human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }

    /// Convert into the machine-readable error envelope.
    pub fn to_structured(&self) -> StructuredError {
        StructuredError {
            code: self.code(),
            category: self.category(),
            message: self.to_string(),
            remediation: self.remediation().to_string(),
        }
    }
}

/// Machine-readable error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub remediation: String,
}
