//! # Order Service
//!
//! The order write and read paths.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          create_order(req)                              │
//! │                                                                         │
//! │  shape validation ──► reference resolution ──► price ──► persist        │
//! │      │bad shape           │missing refs          Σ line      │          │
//! │      ▼                    ▼                      prices      ▼          │
//! │  InvalidArgument       NotFound                         invalidate      │
//! │  (nothing persisted)   (nothing persisted)              report bucket   │
//! │                                                         (best effort)   │
//! │                                                                         │
//! │  update_order(id, req) merges only the provided fields; a replaced      │
//! │  product list is re-resolved and re-priced, an omitted one keeps        │
//! │  the stored lines and total. Moving an order across dates               │
//! │  invalidates both the old and the new report bucket.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{report_cache_key, ReportCache};
use crate::error::{ServiceError, ServiceResult};
use crate::validator::ReferenceValidator;
use vend_core::validation::{validate_create_order, validate_id, validate_update_order};
use vend_core::{order_total, CreateOrderRequest, Order, OrderDetail, UpdateOrderRequest};
use vend_db::{OrderChanges, OrderRepository};

/// Order write and read operations.
pub struct OrderService {
    orders: OrderRepository,
    validator: ReferenceValidator,
    cache: Arc<dyn ReportCache>,
    report_offset: FixedOffset,
    invalidate_timeout: Duration,
}

impl OrderService {
    pub fn new(
        orders: OrderRepository,
        validator: ReferenceValidator,
        cache: Arc<dyn ReportCache>,
        report_offset: FixedOffset,
        invalidate_timeout: Duration,
    ) -> Self {
        OrderService {
            orders,
            validator,
            cache,
            report_offset,
            invalidate_timeout,
        }
    }

    /// Creates an order.
    ///
    /// All reference checks happen before anything is written; a failure
    /// at any step persists nothing. The total is priced from current
    /// product prices at write time and stored as a snapshot.
    pub async fn create_order(&self, req: &CreateOrderRequest) -> ServiceResult<Order> {
        validate_create_order(req)?;

        let product_ids: Vec<String> =
            req.products.iter().map(|line| line.product.clone()).collect();
        let resolved = self.validator.resolve(&req.customer, &product_ids).await?;

        let total = order_total(&resolved.line_products);
        let now = Utc::now();
        let timestamp = req.timestamp.unwrap_or(now);

        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: resolved.customer.id.clone(),
            product_ids,
            total_price_cents: total.cents(),
            timestamp,
            created_at: now,
            updated_at: now,
        };

        self.orders.insert(&order).await?;
        info!(
            id = %order.id,
            customer = %order.customer_id,
            total_cents = order.total_price_cents,
            "Created order"
        );

        self.invalidate_bucket(order.timestamp).await;

        Ok(order)
    }

    /// Applies a partial update to an order.
    ///
    /// Only the provided fields change. A new product list is resolved
    /// and re-priced as on create; an omitted list keeps the stored
    /// lines and total untouched.
    pub async fn update_order(
        &self,
        id: &str,
        req: &UpdateOrderRequest,
    ) -> ServiceResult<Order> {
        validate_id("id", id)?;
        validate_update_order(req)?;

        let existing = self
            .orders
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", id)))?;

        let mut changes = OrderChanges::default();

        if let Some(customer_id) = &req.customer {
            let customer = self.validator.resolve_customer(customer_id).await?;
            changes.customer_id = Some(customer.id);
        }

        if let Some(lines) = &req.products {
            let product_ids: Vec<String> =
                lines.iter().map(|line| line.product.clone()).collect();
            let line_products = self.validator.resolve_products(&product_ids).await?;
            let total = order_total(&line_products);
            changes.products = Some((product_ids, total.cents()));
        }

        changes.timestamp = req.timestamp;

        // A body carrying no fields changes nothing; skip the write and
        // leave the report buckets alone.
        if changes.is_empty() {
            return Ok(existing);
        }

        self.orders.update(id, &changes).await?;
        info!(id = %id, "Updated order");

        // The order may have moved to a different report day; both the
        // old and the effective new bucket are now stale.
        self.invalidate_bucket(existing.timestamp).await;
        let new_timestamp = req.timestamp.unwrap_or(existing.timestamp);
        if report_day(new_timestamp, self.report_offset)
            != report_day(existing.timestamp, self.report_offset)
        {
            self.invalidate_bucket(new_timestamp).await;
        }

        self.orders
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", id)))
    }

    /// Gets one order with customer and product detail.
    pub async fn get_order(&self, id: &str) -> ServiceResult<OrderDetail> {
        validate_id("id", id)?;

        self.orders
            .get_detail(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", id)))
    }

    /// Lists all orders with customer and product detail.
    pub async fn list_orders(&self) -> ServiceResult<Vec<OrderDetail>> {
        Ok(self.orders.list_detail().await?)
    }

    /// Drops the cached report for the day this timestamp falls in.
    ///
    /// Best effort: a slow or failing cache must not fail the write that
    /// already committed. Stale entries age out within the TTL anyway.
    async fn invalidate_bucket(&self, timestamp: DateTime<Utc>) {
        let key = report_cache_key(report_day(timestamp, self.report_offset));

        match tokio::time::timeout(self.invalidate_timeout, self.cache.invalidate(&key)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(%key, error = %err, "Report cache invalidation failed");
            }
            Err(_) => {
                warn!(%key, "Report cache invalidation timed out");
            }
        }
    }
}

/// The report calendar day a timestamp falls in, under the reporting
/// offset.
fn report_day(timestamp: DateTime<Utc>, offset: FixedOffset) -> chrono::NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

// =============================================================================
// Unit Tests
// =============================================================================
