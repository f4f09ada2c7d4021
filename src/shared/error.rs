//! Shared Error Types
//!
//! Failures that both the server and a client can detect on their own:
//! missing or malformed input fields.
//!
//! # Usage
//!
//! ```rust
//! use taskboard::shared::error::SharedError;
//!
//! let error = SharedError::validation("name", "name is required");
//! assert!(error.to_string().contains("name"));
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Missing or malformed field
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Require a present, non-blank string field.
pub fn require_text(field: &str, value: Option<&str>) -> Result<String, SharedError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SharedError::validation(field, format!("{} is required", field))),
    }
}

/// Require a present value.
pub fn require<T>(field: &str, value: Option<T>) -> Result<T, SharedError> {
    value.ok_or_else(|| SharedError::validation(field, format!("{} is required", field)))
}

/// Positions must be finite numbers.
pub fn require_finite(field: &str, value: f64) -> Result<f64, SharedError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SharedError::validation(field, format!("{} must be a finite number", field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let SharedError::ValidationError { field, message } =
            SharedError::validation("boardId", "boardId is required");
        assert_eq!(field, "boardId");
        assert_eq!(message, "boardId is required");
    }

    #[test]
    fn test_require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("name", Some("  Todo ")).unwrap(), "Todo");
        assert!(require_text("name", Some("   ")).is_err());
        assert!(require_text("name", None).is_err());
    }

    #[test]
    fn test_require_finite() {
        assert_eq!(require_finite("position", 1.5).unwrap(), 1.5);
        assert!(require_finite("position", f64::NAN).is_err());
        assert!(require_finite("position", f64::INFINITY).is_err());
    }
}
