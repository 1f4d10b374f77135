//! # Error Types
//!
//! Validation error types for vend-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vend-core errors (this file)                                           │
//! │  └── ValidationError  - Request-shape validation failures               │
//! │                                                                         │
//! │  vend-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  vend-service errors (separate crate)                                   │
//! │  └── ServiceError     - InvalidArgument / NotFound / Internal           │
//! │                                                                         │
//! │  Flow: ValidationError → ServiceError::InvalidArgument                  │
//! │        DbError         → ServiceError::{NotFound, Internal}             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request payload doesn't meet shape requirements.
/// Detected at the boundary, before any store access happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A list field must contain at least one element.
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Invalid format (e.g., malformed UUID, malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "customer".to_string(),
        };
        assert_eq!(err.to_string(), "customer is required");

        let err = ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "date has invalid format: expected YYYY-MM-DD"
        );
    }
}
