//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Write/Read Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order Storage                                   │
//! │                                                                         │
//! │  WRITE (one transaction)                                                │
//! │    orders:       id │ customer_id │ total_price_cents │ timestamp       │
//! │    order_items:  one row per line item, position keeps request order    │
//! │                                                                         │
//! │  READ (denormalized)                                                    │
//! │    orders ⟕ customers ⟕ products ──► rows ──► grouped in app code       │
//! │    by order, then by line position. A referenced row that no longer     │
//! │    exists joins to NULL and surfaces as an explicit placeholder.        │
//! │                                                                         │
//! │  AGGREGATE (daily report)                                               │
//! │    COUNT/SUM over orders in [start, end], plus grouped line-item        │
//! │    counts for the top sellers, ties broken by product id ascending.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vend_core::{CustomerSummary, Order, OrderDetail, OrderLineDetail, TopSellingItem};

// =============================================================================
// Record Types
// =============================================================================

/// Targeted field merge for an order update.
///
/// `None` fields are left untouched by the UPDATE. Replacing the product
/// list always comes with the recomputed total snapshot; the two change
/// together or not at all.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub customer_id: Option<String>,

    /// New line-item product ids plus the recomputed total in cents.
    pub products: Option<(Vec<String>, i64)>,

    pub timestamp: Option<DateTime<Utc>>,
}

impl OrderChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() && self.products.is_none() && self.timestamp.is_none()
    }
}

/// Day-window totals for the report generator.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct DayTotals {
    pub order_count: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    total_price_cents: i64,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// One row of the denormalized join; customer/product columns are NULL
/// when the referenced entity no longer exists.
#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    order_id: String,
    customer_id: String,
    total_price_cents: i64,
    timestamp: DateTime<Utc>,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    product_id: String,
    product_name: Option<String>,
    product_price_cents: Option<i64>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order with its line items in one transaction.
    ///
    /// Either the whole order lands or nothing does; a failed line-item
    /// insert rolls the order row back too.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, lines = order.product_ids.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, total_price_cents, timestamp, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.total_price_cents)
        .bind(order.timestamp)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &order.id, &order.product_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Applies a targeted field merge to an existing order.
    ///
    /// Fields absent from `changes` keep their stored values; in
    /// particular, an update without `products` preserves the line items
    /// and the total price snapshot. Last writer wins on concurrent
    /// updates to the same order.
    pub async fn update(&self, id: &str, changes: &OrderChanges) -> DbResult<()> {
        debug!(id = %id, "Updating order");

        let mut tx = self.pool.begin().await?;

        let new_total = changes.products.as_ref().map(|(_, total)| *total);
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                customer_id = COALESCE(?2, customer_id),
                total_price_cents = COALESCE(?3, total_price_cents),
                timestamp = COALESCE(?4, timestamp),
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&changes.customer_id)
        .bind(new_total)
        .bind(changes.timestamp)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        if let Some((product_ids, _)) = &changes.products {
            sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_items(&mut tx, id, product_ids).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by ID, with line-item product ids in request order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, total_price_cents, timestamp, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let product_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT product_id FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Order {
            id: row.id,
            customer_id: row.customer_id,
            product_ids,
            total_price_cents: row.total_price_cents,
            timestamp: row.timestamp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Gets a single order with customer and product detail joined in.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<OrderDetail>> {
        let rows = self.fetch_detail_rows(Some(id)).await?;
        Ok(group_detail_rows(rows).into_iter().next())
    }

    /// Lists all orders with customer and product detail joined in.
    pub async fn list_detail(&self) -> DbResult<Vec<OrderDetail>> {
        let rows = self.fetch_detail_rows(None).await?;
        Ok(group_detail_rows(rows))
    }

    async fn fetch_detail_rows(&self, id: Option<&str>) -> DbResult<Vec<DetailRow>> {
        // LEFT JOIN on customers/products: there is no FK holding these
        // references, so a deleted entity must still produce the row,
        // with NULL detail columns.
        let base = r#"
            SELECT
                o.id AS order_id,
                o.customer_id AS customer_id,
                o.total_price_cents AS total_price_cents,
                o.timestamp AS timestamp,
                c.name AS customer_name,
                c.email AS customer_email,
                c.phone AS customer_phone,
                i.product_id AS product_id,
                p.name AS product_name,
                p.price_cents AS product_price_cents
            FROM orders o
            LEFT JOIN customers c ON c.id = o.customer_id
            JOIN order_items i ON i.order_id = o.id
            LEFT JOIN products p ON p.id = i.product_id
        "#;

        let rows = match id {
            Some(id) => {
                let sql = format!("{base} WHERE o.id = ?1 ORDER BY i.position");
                sqlx::query_as::<_, DetailRow>(&sql)
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{base} ORDER BY o.timestamp, o.id, i.position");
                sqlx::query_as::<_, DetailRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows)
    }

    /// Computes order count and revenue over a timestamp window.
    ///
    /// Always returns a row; an empty window comes back as zero counts
    /// and the caller decides what "no data" means.
    pub async fn aggregate_day(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<DayTotals> {
        let totals = sqlx::query_as::<_, DayTotals>(
            r#"
            SELECT
                COUNT(*) AS order_count,
                COALESCE(SUM(total_price_cents), 0) AS revenue_cents
            FROM orders
            WHERE timestamp >= ?1 AND timestamp <= ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Top products by unit count sold within a timestamp window.
    ///
    /// One unit per line item; ties broken by product id ascending so
    /// the ranking is deterministic.
    pub async fn top_selling(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> DbResult<Vec<TopSellingItem>> {
        let items = sqlx::query_as::<_, TopSellingItem>(
            r#"
            SELECT
                i.product_id AS product_id,
                p.name AS name,
                p.price_cents AS price_cents,
                COUNT(*) AS count
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            LEFT JOIN products p ON p.id = i.product_id
            WHERE o.timestamp >= ?1 AND o.timestamp <= ?2
            GROUP BY i.product_id
            ORDER BY COUNT(*) DESC, i.product_id ASC
            LIMIT ?3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: &str,
    product_ids: &[String],
) -> DbResult<()> {
    for (position, product_id) in product_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, position)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(order_id)
        .bind(product_id)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Groups join rows into OrderDetail values, by order then by line
/// position. Rows arrive pre-sorted, so encounter order is kept.
fn group_detail_rows(rows: Vec<DetailRow>) -> Vec<OrderDetail> {
    let mut details: Vec<OrderDetail> = Vec::new();

    for row in rows {
        let line = OrderLineDetail {
            product_id: row.product_id,
            name: row.product_name,
            price_cents: row.product_price_cents,
        };

        match details.last_mut() {
            Some(detail) if detail.id == row.order_id => {
                detail.products.push(line);
            }
            _ => {
                let customer = row.customer_name.map(|name| CustomerSummary {
                    id: row.customer_id.clone(),
                    name,
                    email: row.customer_email.unwrap_or_default(),
                    phone: row.customer_phone,
                });

                details.push(OrderDetail {
                    id: row.order_id,
                    customer_id: row.customer_id,
                    customer,
                    products: vec![line],
                    total_price_cents: row.total_price_cents,
                    timestamp: row.timestamp,
                });
            }
        }
    }

    details
}

/// Helper to generate a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
