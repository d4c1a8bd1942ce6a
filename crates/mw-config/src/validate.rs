//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::eval::EvalConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest day of year (leap years).
const MAX_DOY: u16 = 366;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::SemanticError(_) => 63,
        }
    }

    /// Name of the offending field, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidValue { field, .. } => Some(field),
            ValidationError::SemanticError(_) => None,
        }
    }
}

/// Validate evaluation parameters semantically.
pub fn validate_config(config: &EvalConfig) -> ValidationResult<()> {
    let range = config.valid_range;
    if range.start == 0 || range.start > MAX_DOY {
        return Err(ValidationError::InvalidValue {
            field: "valid_range.start".to_string(),
            message: format!("Must be in [1, {}], got {}", MAX_DOY, range.start),
        });
    }
    if range.end == 0 || range.end > MAX_DOY {
        return Err(ValidationError::InvalidValue {
            field: "valid_range.end".to_string(),
            message: format!("Must be in [1, {}], got {}", MAX_DOY, range.end),
        });
    }
    if range.start > range.end {
        return Err(ValidationError::SemanticError(format!(
            "valid_range start {} is after end {}",
            range.start, range.end
        )));
    }

    if config.tolerance > u32::from(MAX_DOY) {
        return Err(ValidationError::InvalidValue {
            field: "tolerance".to_string(),
            message: format!("Must be at most {} days, got {}", MAX_DOY, config.tolerance),
        });
    }

    if config.event_min_difference > u32::from(MAX_DOY) {
        return Err(ValidationError::InvalidValue {
            field: "event_min_difference".to_string(),
            message: format!(
                "Must be at most {} days, got {}",
                MAX_DOY, config.event_min_difference
            ),
        });
    }

    Ok(())
}
