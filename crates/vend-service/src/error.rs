//! Service error taxonomy.
//!
//! Every fallible service operation resolves to one of three outcomes a
//! caller can act on: the request was malformed, a referenced thing does
//! not exist, or something broke on our side.

use vend_core::ValidationError;
use vend_db::DbError;

/// Service-level error returned by all public operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request is malformed (bad id format, empty product list,
    /// unparseable or future report date).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entity does not exist, or a report was requested
    /// for a day with no orders.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage or serialization failure. The message is safe to log but
    /// carries no actionable detail for the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ServiceError::NotFound(format!("{} {} not found", entity, id))
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::InvalidArgument(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(format!("serialization failed: {}", err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ServiceError = DbError::not_found("Order", "abc").into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_other_db_errors_map_to_internal() {
        let err: ServiceError = DbError::QueryFailed("boom".to_string()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_validation_maps_to_invalid_argument() {
        let err: ServiceError = ValidationError::Empty {
            field: "products".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }
}
