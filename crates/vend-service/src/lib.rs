//! # vend-service: Order Processing and Reporting
//!
//! This crate wires the stores, the reference validator, and the report
//! cache into the public service surface.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       vend-service (THIS CRATE)                         │
//! │                                                                         │
//! │   ┌──────────────┐        ┌────────────────────┐                        │
//! │   │ OrderService │───────►│ ReferenceValidator │──► customer/product    │
//! │   │  create      │        └────────────────────┘    stores (vend-db)    │
//! │   │  update      │───────► order store (vend-db)                        │
//! │   │  get/list    │───────► report cache (invalidate on write)           │
//! │   └──────────────┘                                                      │
//! │                                                                         │
//! │   ┌───────────────┐       ┌──────────────────────┐                      │
//! │   │ ReportService │──────►│ DailyReportGenerator │──► order aggregates  │
//! │   │  cache-aside  │──────►│ ReportCache (trait)  │    (vend-db)         │
//! │   └───────────────┘       └──────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`orders`] - Order write and read paths
//! - [`report`] - Daily report generation with cache-aside reads
//! - [`validator`] - Cross-entity reference resolution
//! - [`cache`] - Report cache trait and in-memory implementation
//! - [`config`] - Environment-driven configuration
//! - [`error`] - The three-outcome service error taxonomy

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod config;
pub mod error;
pub mod orders;
pub mod report;
pub mod validator;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::{MemoryReportCache, ReportCache};
pub use config::{ConfigError, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use orders::OrderService;
pub use report::{DailyReportGenerator, ReportGenerator, ReportService};
pub use validator::ReferenceValidator;

use std::sync::Arc;
use std::time::Duration;
use vend_db::{Database, DbConfig};

/// The fully wired service surface.
pub struct Services {
    pub orders: OrderService,
    pub reports: ReportService,
}

impl Services {
    /// Connects to the database and wires both services from config.
    pub async fn connect(config: &ServiceConfig) -> ServiceResult<Self> {
        let db = Database::new(DbConfig::new(&config.database_path))
            .await
            .map_err(|err| ServiceError::Internal(err.to_string()))?;
        Ok(Self::wire(&db, config))
    }

    /// Wires both services over an existing database handle, sharing one
    /// in-memory report cache.
    pub fn wire(db: &Database, config: &ServiceConfig) -> Self {
        let cache: Arc<dyn ReportCache> = Arc::new(MemoryReportCache::new());
        let ttl = Duration::from_secs(config.report_ttl_secs);

        let validator = ReferenceValidator::new(db.customers(), db.products());
        let orders = OrderService::new(
            db.orders(),
            validator,
            cache.clone(),
            config.report_offset,
            config.invalidate_timeout,
        );

        let generator = Arc::new(DailyReportGenerator::new(
            db.orders(),
            config.report_offset,
        ));
        let reports = ReportService::new(generator, cache, config.report_offset, ttl);

        Services { orders, reports }
    }
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;
    use vend_core::{CreateOrderRequest, OrderLineRequest, Product, UpdateOrderRequest};
    use vend_db::repository::customer::new_customer;
    use vend_db::repository::product::new_product;

    async fn setup() -> (Database, Services, String, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let customer = new_customer("Ada", "ada@example.com", None);
        db.customers().insert(&customer).await.unwrap();

        let p1 = new_product("Widget", 1000);
        let p2 = new_product("Gadget", 500);
        db.products().insert(&p1).await.unwrap();
        db.products().insert(&p2).await.unwrap();

        let services = Services::wire(&db, &ServiceConfig::default());
        (db, services, customer.id, p1, p2)
    }

    fn lines(ids: &[&str]) -> Vec<OrderLineRequest> {
        ids.iter()
            .map(|id| OrderLineRequest {
                product: id.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_create_prices_duplicate_lines_per_occurrence() {
        let (_db, services, customer_id, p1, p2) = setup().await;

        let order = services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p1.id, &p1.id, &p2.id]),
                timestamp: None,
            })
            .await
            .unwrap();

        assert_eq!(order.total_price_cents, 2500);
        assert_eq!(order.product_ids.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_customer_persists_nothing() {
        let (db, services, _customer_id, p1, _p2) = setup().await;

        let err = services
            .orders
            .create_order(&CreateOrderRequest {
                customer: Uuid::new_v4().to_string(),
                products: lines(&[&p1.id]),
                timestamp: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_one_missing_product_persists_nothing() {
        let (db, services, customer_id, p1, p2) = setup().await;

        let ghost = Uuid::new_v4().to_string();
        let err = services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p1.id, &ghost, &p2.id]),
                timestamp: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_customer_only_update_preserves_products_and_total() {
        let (db, services, customer_id, p1, p2) = setup().await;

        let order = services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p1.id, &p2.id]),
                timestamp: None,
            })
            .await
            .unwrap();

        let other = new_customer("Grace", "grace@example.com", None);
        db.customers().insert(&other).await.unwrap();

        let updated = services
            .orders
            .update_order(
                &order.id,
                &UpdateOrderRequest {
                    customer: Some(other.id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.customer_id, other.id);
        assert_eq!(updated.product_ids, order.product_ids);
        assert_eq!(updated.total_price_cents, 1500);
    }

    #[tokio::test]
    async fn test_product_update_reprices_from_current_prices() {
        let (_db, services, customer_id, p1, p2) = setup().await;

        let order = services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p1.id]),
                timestamp: None,
            })
            .await
            .unwrap();
        assert_eq!(order.total_price_cents, 1000);

        let updated = services
            .orders
            .update_order(
                &order.id,
                &UpdateOrderRequest {
                    products: Some(lines(&[&p2.id, &p2.id])),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.total_price_cents, 1000);
        assert_eq!(updated.product_ids, vec![p2.id.clone(), p2.id]);
    }

    #[tokio::test]
    async fn test_write_invalidates_report_bucket() {
        let (_db, services, customer_id, p1, _p2) = setup().await;

        let jan1_morning = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id.clone(),
                products: lines(&[&p1.id]),
                timestamp: Some(jan1_morning),
            })
            .await
            .unwrap();

        let first = services.reports.daily_report("2024-01-01").await.unwrap();
        assert_eq!(first.number_of_orders, 1);
        assert_eq!(first.total_revenue_cents, 1000);

        // A second write into the same day must drop the cached report.
        services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p1.id]),
                timestamp: Some(jan1_morning),
            })
            .await
            .unwrap();

        let second = services.reports.daily_report("2024-01-01").await.unwrap();
        assert_eq!(second.number_of_orders, 2);
        assert_eq!(second.total_revenue_cents, 2000);
    }

    #[tokio::test]
    async fn test_empty_day_report_is_not_found() {
        let (_db, services, _customer_id, _p1, _p2) = setup().await;

        let err = services
            .reports
            .daily_report("2024-01-01")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_daily_report_end_to_end() {
        let (_db, services, customer_id, p1, p2) = setup().await;

        // Two orders on 2024-01-01: [P1, P1] for $20 and [P2] for $5.
        services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id.clone(),
                products: lines(&[&p1.id, &p1.id]),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            })
            .await
            .unwrap();
        services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id.clone(),
                products: lines(&[&p2.id]),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 16, 30, 0).unwrap()),
            })
            .await
            .unwrap();
        // Next day, outside the window.
        services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p2.id]),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
            })
            .await
            .unwrap();

        let report = services.reports.daily_report("2024-01-01").await.unwrap();
        assert_eq!(report.total_revenue_cents, 2500);
        assert_eq!(report.number_of_orders, 2);
        assert_eq!(report.top_selling_items.len(), 2);
        assert_eq!(report.top_selling_items[0].product_id, p1.id);
        assert_eq!(report.top_selling_items[0].count, 2);
        assert_eq!(report.top_selling_items[1].product_id, p2.id);
        assert_eq!(report.top_selling_items[1].count, 1);
    }

    #[tokio::test]
    async fn test_moving_order_across_dates_invalidates_both_buckets() {
        let (_db, services, customer_id, p1, _p2) = setup().await;

        let order = services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p1.id]),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            })
            .await
            .unwrap();

        // Prime the Jan 1 cache entry.
        let report = services.reports.daily_report("2024-01-01").await.unwrap();
        assert_eq!(report.number_of_orders, 1);

        services
            .orders
            .update_order(
                &order.id,
                &UpdateOrderRequest {
                    timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Jan 1 is now empty; the stale cached report must not resurface.
        let err = services
            .reports
            .daily_report("2024-01-01")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let moved = services.reports.daily_report("2024-01-02").await.unwrap();
        assert_eq!(moved.number_of_orders, 1);
    }

    #[tokio::test]
    async fn test_get_and_list_return_denormalized_detail() {
        let (_db, services, customer_id, p1, p2) = setup().await;

        let order = services
            .orders
            .create_order(&CreateOrderRequest {
                customer: customer_id,
                products: lines(&[&p1.id, &p2.id]),
                timestamp: None,
            })
            .await
            .unwrap();

        let detail = services.orders.get_order(&order.id).await.unwrap();
        assert_eq!(detail.customer.as_ref().unwrap().name, "Ada");
        assert_eq!(detail.total_price_cents, 1500);
        assert_eq!(detail.products[0].name.as_deref(), Some("Widget"));

        let all = services.orders.list_orders().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, order.id);
    }
}
