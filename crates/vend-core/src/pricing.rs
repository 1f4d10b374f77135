//! # Pricing Calculator
//!
//! Computes an order's total price from its resolved line products.
//!
//! ## Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order lines: [P1, P1, P2]     (duplicates = separate line items)       │
//! │                                                                         │
//! │  order_total = price(P1) + price(P1) + price(P2)                        │
//! │                                                                         │
//! │  One unit per occurrence. No discounts, no tax, no currency             │
//! │  conversion. The result is a snapshot stored on the order; later        │
//! │  price changes never touch it.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::Product;

/// Computes the total price of an order from its resolved line products.
///
/// The slice must carry one entry per line item, in line order, with
/// repeated product references already multiplied out by the caller
/// (the reference validator resolves requests into this shape).
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use vend_core::pricing::order_total;
/// use vend_core::types::Product;
///
/// let p = |id: &str, cents: i64| Product {
///     id: id.to_string(),
///     name: format!("Product {id}"),
///     price_cents: cents,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// // Two units of a $5.00 product => $10.00
/// let total = order_total(&[p("a", 500), p("a", 500)]);
/// assert_eq!(total.cents(), 1000);
/// ```
pub fn order_total(line_products: &[Product]) -> Money {
    line_products.iter().map(Product::price).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price_cents,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_sums_unit_prices() {
        let total = order_total(&[product("a", 1000), product("b", 500)]);
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_repeated_product_counts_each_occurrence() {
        // Two units of a $5 product => totalPrice 10
        let total = order_total(&[product("a", 500), product("a", 500)]);
        assert_eq!(total.cents(), 1000);
    }

    #[test]
    fn test_free_products_allowed() {
        let total = order_total(&[product("a", 0), product("b", 250)]);
        assert_eq!(total.cents(), 250);
    }
}
