//! # Validation Module
//!
//! Request-shape validation for Vend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE - explicit predicate checks of payload shape      │
//! │  ├── required fields, non-empty product list, identifier format         │
//! │  └── plain functions, no framework                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Reference validator (vend-service)                            │
//! │  └── cross-entity existence checks against the stores                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  └── NOT NULL / CHECK constraints                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationResult};
use crate::types::{CreateOrderRequest, UpdateOrderRequest};

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates an entity identifier (UUID v4 format).
///
/// ## Example
/// ```rust
/// use vend_core::validation::validate_id;
///
/// assert!(validate_id("customer", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("customer", "not-a-uuid").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{id}' is not a valid UUID"),
    })?;

    Ok(())
}

// =============================================================================
// Order Payload Validators
// =============================================================================

/// Validates the shape of a create-order payload.
///
/// ## Rules
/// - `customer` must be a well-formed identifier
/// - `products` must be non-empty; duplicates are allowed and there is
///   no upper bound on line count
/// - every product reference must be a well-formed identifier
pub fn validate_create_order(req: &CreateOrderRequest) -> ValidationResult<()> {
    validate_id("customer", &req.customer)?;
    validate_order_lines(&req.products)
}

/// Validates the shape of a partial order update.
///
/// Absent fields are untouched by the update and not validated.
pub fn validate_update_order(req: &UpdateOrderRequest) -> ValidationResult<()> {
    if let Some(customer) = &req.customer {
        validate_id("customer", customer)?;
    }

    if let Some(products) = &req.products {
        validate_order_lines(products)?;
    }

    Ok(())
}

fn validate_order_lines(lines: &[crate::types::OrderLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Empty {
            field: "products".to_string(),
        });
    }

    for line in lines {
        validate_id("products.product", &line.product)?;
    }

    Ok(())
}

// =============================================================================
// Report Date Validator
// =============================================================================

/// Parses and validates a report date parameter (`YYYY-MM-DD`).
///
/// Future-date rejection needs a clock and lives in the report service;
/// this only checks the format.
pub fn validate_report_date(date: &str) -> ValidationResult<NaiveDate> {
    let date = date.trim();

    if date.is_empty() {
        return Err(ValidationError::Required {
            field: "date".to_string(),
        });
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: "date".to_string(),
        reason: format!("'{date}' is not a YYYY-MM-DD date"),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderLineRequest;

    const C1: &str = "550e8400-e29b-41d4-a716-446655440000";
    const P1: &str = "550e8400-e29b-41d4-a716-446655440001";

    fn line(id: &str) -> OrderLineRequest {
        OrderLineRequest {
            product: id.to_string(),
        }
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("customer", C1).is_ok());
        assert!(validate_id("customer", "").is_err());
        assert!(validate_id("customer", "   ").is_err());
        assert!(validate_id("customer", "not-a-uuid").is_err());
    }

    #[test]
    fn test_create_order_requires_products() {
        let req = CreateOrderRequest {
            customer: C1.to_string(),
            products: vec![],
            timestamp: None,
        };
        assert!(validate_create_order(&req).is_err());
    }

    #[test]
    fn test_create_order_checks_every_line() {
        let req = CreateOrderRequest {
            customer: C1.to_string(),
            products: vec![line(P1), line("bogus")],
            timestamp: None,
        };
        assert!(validate_create_order(&req).is_err());

        let req = CreateOrderRequest {
            customer: C1.to_string(),
            products: vec![line(P1), line(P1)],
            timestamp: None,
        };
        // Duplicate references are valid line items.
        assert!(validate_create_order(&req).is_ok());
    }

    #[test]
    fn test_create_order_has_no_line_count_cap() {
        // Any non-empty list of well-formed references is a valid shape,
        // however long.
        let req = CreateOrderRequest {
            customer: C1.to_string(),
            products: (0..101).map(|_| line(P1)).collect(),
            timestamp: None,
        };
        assert!(validate_create_order(&req).is_ok());
    }

    #[test]
    fn test_update_order_absent_fields_skip_validation() {
        let req = UpdateOrderRequest::default();
        assert!(validate_update_order(&req).is_ok());

        let req = UpdateOrderRequest {
            products: Some(vec![]),
            ..Default::default()
        };
        // Present but empty is rejected.
        assert!(validate_update_order(&req).is_err());
    }

    #[test]
    fn test_validate_report_date() {
        assert_eq!(
            validate_report_date("2024-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert!(validate_report_date("").is_err());
        assert!(validate_report_date("01/01/2024").is_err());
        assert!(validate_report_date("2024-13-40").is_err());
    }
}
