//! # Domain Types
//!
//! Core domain types used throughout Vend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Product     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  customer_id    │       │
//! │  │  email          │   │  price_cents    │   │  product_ids    │       │
//! │  │  phone          │   │                 │   │  total_price    │       │
//! │  └─────────────────┘   └─────────────────┘   │  timestamp      │       │
//! │                                              └─────────────────┘       │
//! │                                                                         │
//! │  Denormalized read views: OrderDetail / OrderLineDetail                 │
//! │  Report shapes:           DailyReport / TopSellingItem                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Snapshots
//! An order's `total_price_cents` is computed from product prices at write
//! time and never recomputed. Later product price changes do not affect
//! existing orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer who can place orders.
///
/// Owned by the entity store; read-only from the order subsystem's
/// perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    pub email: String,

    pub phone: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be referenced by order line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Unit price in cents (smallest currency unit). Non-negative.
    pub price_cents: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A purchase order linking a customer to an ordered sequence of products.
///
/// ## Invariants
/// - `customer_id` and every entry in `product_ids` resolved at write time
/// - `product_ids` is non-empty; duplicates are separate line items
/// - `total_price_cents == Σ price(p)` over `product_ids` at write time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The customer who placed the order (exactly one).
    pub customer_id: String,

    /// Product references in line-item order. Duplicates allowed;
    /// each occurrence is one unit.
    pub product_ids: Vec<String>,

    /// Total price snapshot in cents, derived at write time.
    #[serde(rename = "totalPrice")]
    pub total_price_cents: i64,

    /// Report-date bucket for this order. Defaults to the creation instant.
    pub timestamp: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the total price as a Money type.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Denormalized Read Views
// =============================================================================

/// Customer fields joined into an order read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// One line item with joined product detail.
///
/// `name`/`price` are `None` when the referenced product no longer
/// resolves: the placeholder is serialized as an explicit `null`, never
/// omitted, so total-price-vs-line-items consistency stays debuggable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineDetail {
    pub product_id: String,

    pub name: Option<String>,

    #[serde(rename = "price")]
    pub price_cents: Option<i64>,
}

/// A denormalized order representation: customer and product detail
/// joined in, grouped by order then by line position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: String,

    /// The raw reference is always present even when the joined detail
    /// is unavailable.
    pub customer_id: String,

    /// `None` when the referenced customer no longer resolves.
    pub customer: Option<CustomerSummary>,

    pub products: Vec<OrderLineDetail>,

    #[serde(rename = "totalPrice")]
    pub total_price_cents: i64,

    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Daily Report
// =============================================================================

/// One entry in the top-selling list of a daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopSellingItem {
    pub product_id: String,

    /// `None` when the product has been deleted since the orders were
    /// written (explicit placeholder, see [`OrderLineDetail`]).
    pub name: Option<String>,

    #[serde(rename = "price")]
    pub price_cents: Option<i64>,

    /// Total unit count sold within the report window.
    pub count: i64,
}

/// A computed daily sales report snapshot.
///
/// This is the cached value for a report bucket; it is always replaced
/// wholesale, never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    #[serde(rename = "totalRevenue")]
    pub total_revenue_cents: i64,

    #[serde(rename = "numberOfOrders")]
    pub number_of_orders: i64,

    /// The 5 products with the highest unit counts, ties broken by
    /// product id ascending.
    #[serde(rename = "topSellingItems")]
    pub top_selling_items: Vec<TopSellingItem>,
}

// =============================================================================
// Request Payloads
// =============================================================================

/// One product reference in an order payload: `{ "product": "<id>" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product: String,
}

/// Payload for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer: String,

    pub products: Vec<OrderLineRequest>,

    /// Optional explicit timestamp; defaults to the creation instant.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Payload for a partial order update.
///
/// An update that omits `products` preserves the existing product list
/// and the total price snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub customer: Option<String>,

    #[serde(default)]
    pub products: Option<Vec<OrderLineRequest>>,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_price_accessor() {
        let product = Product {
            id: "p1".to_string(),
            name: "Widget".to_string(),
            price_cents: 1099,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.price(), Money::from_cents(1099));
    }

    #[test]
    fn test_daily_report_wire_shape() {
        let report = DailyReport {
            total_revenue_cents: 2500,
            number_of_orders: 2,
            top_selling_items: vec![TopSellingItem {
                product_id: "p1".to_string(),
                name: Some("Widget".to_string()),
                price_cents: Some(1000),
                count: 2,
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalRevenue"], 2500);
        assert_eq!(json["numberOfOrders"], 2);
        assert_eq!(json["topSellingItems"][0]["product_id"], "p1");
        assert_eq!(json["topSellingItems"][0]["price"], 1000);
        assert_eq!(json["topSellingItems"][0]["count"], 2);
    }

    #[test]
    fn test_missing_product_detail_serializes_as_null() {
        let line = OrderLineDetail {
            product_id: "p1".to_string(),
            name: None,
            price_cents: None,
        };
        let json = serde_json::to_value(&line).unwrap();
        // Placeholder must be present, not omitted.
        assert!(json.as_object().unwrap().contains_key("name"));
        assert!(json["name"].is_null());
        assert!(json["price"].is_null());
    }

    #[test]
    fn test_update_request_partial_deserialization() {
        let req: UpdateOrderRequest =
            serde_json::from_str(r#"{"customer":"c1"}"#).unwrap();
        assert_eq!(req.customer.as_deref(), Some("c1"));
        assert!(req.products.is_none());
        assert!(req.timestamp.is_none());
    }
}
