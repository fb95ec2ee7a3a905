//! Validation errors for domain value objects.

use thiserror::Error;

/// Errors raised when constructing domain value objects from raw input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an EmptyField error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_message() {
        let err = ValidationError::empty_field("game_title");
        assert_eq!(err.to_string(), "Field 'game_title' cannot be empty");
    }

    #[test]
    fn test_invalid_format_message() {
        let err = ValidationError::invalid_format("provider", "unknown provider 'mistral'");
        assert_eq!(
            err.to_string(),
            "Field 'provider' has invalid format: unknown provider 'mistral'"
        );
    }
}
