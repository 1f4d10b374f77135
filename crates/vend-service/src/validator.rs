//! # Reference Validator
//!
//! Cross-entity existence checks for order writes.
//!
//! ## Resolution Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reference Resolution                               │
//! │                                                                         │
//! │  customer id ──► format check ──► store lookup ──► Customer             │
//! │                       │bad             │absent                          │
//! │                       ▼                ▼                                │
//! │                 InvalidArgument     NotFound                            │
//! │                                                                         │
//! │  product ids ──► format checks ──► ONE batched lookup of the            │
//! │  (per line)                        distinct ids, then a count           │
//! │                                    equality check:                      │
//! │                                    found < distinct ──► NotFound        │
//! │                                    (never reported per-id)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution happens before anything is written, so a failed order
//! create persists nothing.

use std::collections::HashMap;
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use vend_core::validation::validate_id;
use vend_core::{Customer, Product};
use vend_db::{CustomerRepository, ProductRepository};

/// Result of a successful reference resolution.
///
/// `line_products` is one entry per requested line, in request order;
/// a product referenced twice appears twice.
#[derive(Debug)]
pub struct ResolvedRefs {
    pub customer: Customer,
    pub line_products: Vec<Product>,
}

/// Resolves customer and product references against the stores.
#[derive(Debug, Clone)]
pub struct ReferenceValidator {
    customers: CustomerRepository,
    products: ProductRepository,
}

impl ReferenceValidator {
    pub fn new(customers: CustomerRepository, products: ProductRepository) -> Self {
        ReferenceValidator {
            customers,
            products,
        }
    }

    /// Resolves a customer id plus a list of line product ids.
    ///
    /// Product lookup is a single batched query over the distinct ids;
    /// missing products are reported collectively, not per id.
    pub async fn resolve(
        &self,
        customer_id: &str,
        product_ids: &[String],
    ) -> ServiceResult<ResolvedRefs> {
        let customer = self.resolve_customer(customer_id).await?;
        let line_products = self.resolve_products(product_ids).await?;

        Ok(ResolvedRefs {
            customer,
            line_products,
        })
    }

    /// Resolves a customer id alone (customer-only order updates).
    pub async fn resolve_customer(&self, customer_id: &str) -> ServiceResult<Customer> {
        validate_id("customer", customer_id)?;

        self.customers
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("customer {} not found", customer_id)))
    }

    /// Resolves line product ids alone (product-only order updates).
    pub async fn resolve_products(&self, product_ids: &[String]) -> ServiceResult<Vec<Product>> {
        for id in product_ids {
            validate_id("products.product", id)?;
        }

        // Distinct ids, first-seen order.
        let mut distinct: Vec<String> = Vec::new();
        for id in product_ids {
            if !distinct.contains(id) {
                distinct.push(id.clone());
            }
        }

        let found = self.products.get_by_ids(&distinct).await?;
        if found.len() < distinct.len() {
            debug!(
                requested = distinct.len(),
                found = found.len(),
                "Product reference resolution failed"
            );
            return Err(ServiceError::NotFound(
                "one or more products not found".to_string(),
            ));
        }

        // Re-expand to one product per requested line.
        let by_id: HashMap<&str, &Product> =
            found.iter().map(|p| (p.id.as_str(), p)).collect();
        let mut line_products = Vec::with_capacity(product_ids.len());
        for id in product_ids {
            match by_id.get(id.as_str()) {
                Some(product) => line_products.push((*product).clone()),
                None => {
                    // Count equality above makes this unreachable in
                    // practice; keep the error path anyway.
                    return Err(ServiceError::NotFound(
                        "one or more products not found".to_string(),
                    ));
                }
            }
        }

        Ok(line_products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
