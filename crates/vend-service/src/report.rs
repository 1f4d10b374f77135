//! # Daily Report Service
//!
//! Cache-aside daily sales reports.
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      daily_report("2024-01-01")                         │
//! │                                                                         │
//! │  parse date ──► reject future dates ──► cache get                       │
//! │      │bad            │future              ├─ hit ──► cached JSON        │
//! │      ▼               ▼                    │          deserialized       │
//! │  InvalidArgument  InvalidArgument         └─ miss/error                 │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                      generator: COUNT/SUM over the day window           │
//! │                      [00:00:00.000, 23:59:59.999] in the reporting      │
//! │                      offset, plus top-5 unit counts                     │
//! │                                                │                        │
//! │                          0 orders ──► NotFound, nothing cached          │
//! │                          otherwise ─► cache set (best effort), return   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{report_cache_key, ReportCache};
use crate::error::{ServiceError, ServiceResult};
use vend_core::validation::validate_report_date;
use vend_core::DailyReport;
use vend_db::OrderRepository;

/// How many products the top-selling list carries.
pub const TOP_SELLING_LIMIT: u32 = 5;

/// Computes the UTC instant range covering one calendar day in the
/// reporting offset: `[00:00:00.000, 23:59:59.999]`, millisecond
/// granularity, both ends inclusive.
pub fn day_window(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let start = Utc.from_utc_datetime(&local_midnight)
        - ChronoDuration::seconds(offset.local_minus_utc() as i64);
    let end = start + ChronoDuration::days(1) - ChronoDuration::milliseconds(1);
    (start, end)
}

/// Computes a daily report from the order store.
///
/// Object-safe so the report service can hold `Arc<dyn ReportGenerator>`
/// and tests can count invocations.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Generates the report for one calendar day.
    ///
    /// A day with zero orders is `NotFound`; absence of data is not a
    /// report of zeroes.
    async fn generate(&self, date: NaiveDate) -> ServiceResult<DailyReport>;
}

/// Report generator backed by the order store aggregates.
pub struct DailyReportGenerator {
    orders: OrderRepository,
    offset: FixedOffset,
}

impl DailyReportGenerator {
    pub fn new(orders: OrderRepository, offset: FixedOffset) -> Self {
        DailyReportGenerator { orders, offset }
    }
}

#[async_trait]
impl ReportGenerator for DailyReportGenerator {
    async fn generate(&self, date: NaiveDate) -> ServiceResult<DailyReport> {
        let (start, end) = day_window(date, self.offset);
        debug!(%date, %start, %end, "Generating daily report");

        let totals = self.orders.aggregate_day(start, end).await?;
        if totals.order_count == 0 {
            return Err(ServiceError::NotFound(format!(
                "no orders found for {}",
                date.format("%Y-%m-%d")
            )));
        }

        let top_selling_items = self.orders.top_selling(start, end, TOP_SELLING_LIMIT).await?;

        Ok(DailyReport {
            total_revenue_cents: totals.revenue_cents,
            number_of_orders: totals.order_count,
            top_selling_items,
        })
    }
}

// =============================================================================
// Report Service
// =============================================================================

/// Cache-aside front for daily reports.
pub struct ReportService {
    generator: Arc<dyn ReportGenerator>,
    cache: Arc<dyn ReportCache>,
    offset: FixedOffset,
    ttl: Duration,
}

impl ReportService {
    pub fn new(
        generator: Arc<dyn ReportGenerator>,
        cache: Arc<dyn ReportCache>,
        offset: FixedOffset,
        ttl: Duration,
    ) -> Self {
        ReportService {
            generator,
            cache,
            offset,
            ttl,
        }
    }

    /// Returns the daily report for `date` (`YYYY-MM-DD`).
    ///
    /// Cache hits are returned without touching the order store. Cache
    /// failures on either side degrade to a miss and never fail the
    /// request.
    pub async fn daily_report(&self, date: &str) -> ServiceResult<DailyReport> {
        let date = validate_report_date(date)?;

        let today = Utc::now().with_timezone(&self.offset).date_naive();
        if date > today {
            return Err(ServiceError::InvalidArgument(format!(
                "report date {} is in the future",
                date.format("%Y-%m-%d")
            )));
        }

        let key = report_cache_key(date);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => match serde_json::from_str::<DailyReport>(&payload) {
                Ok(report) => {
                    debug!(%key, "Report cache hit");
                    return Ok(report);
                }
                Err(err) => {
                    // Undeserializable payload: treat as a miss and let
                    // the fresh write below replace it.
                    warn!(%key, error = %err, "Discarding corrupt cached report");
                }
            },
            Ok(None) => {}
            Err(err) => {
                warn!(%key, error = %err, "Report cache read failed, regenerating");
            }
        }

        let report = self.generator.generate(date).await?;

        let payload = serde_json::to_string(&report)?;
        if let Err(err) = self.cache.set(&key, &payload, self.ttl).await {
            warn!(%key, error = %err, "Report cache write failed");
        } else {
            info!(%key, orders = report.number_of_orders, "Cached daily report");
        }

        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryReportCache;
    use chrono::Offset;

    #[test]
    fn test_day_window_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (start, end) = day_window(date, Utc.fix());

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap()
                + ChronoDuration::milliseconds(999)
        );
    }

    #[test]
    fn test_day_window_shifts_with_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // UTC+2: local midnight is 22:00 the previous day in UTC.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let (start, _end) = day_window(date, offset);

        assert_eq!(start, Utc.with_ymd_and_hms(2023, 12, 31, 22, 0, 0).unwrap());
    }

    struct FixedGenerator {
        report: DailyReport,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ReportGenerator for FixedGenerator {
        async fn generate(&self, _date: NaiveDate) -> ServiceResult<DailyReport> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(self.report.clone())
        }
    }

    fn sample_report() -> DailyReport {
        DailyReport {
            total_revenue_cents: 2500,
            number_of_orders: 2,
            top_selling_items: vec![],
        }
    }

    #[tokio::test]
    async fn test_malformed_date_is_invalid_argument() {
        let generator = Arc::new(FixedGenerator {
            report: sample_report(),
            calls: Default::default(),
        });
        let service = ReportService::new(
            generator,
            Arc::new(MemoryReportCache::new()),
            Utc.fix(),
            Duration::from_secs(60),
        );

        let err = service.daily_report("01/02/2024").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_future_date_is_invalid_argument() {
        let generator = Arc::new(FixedGenerator {
            report: sample_report(),
            calls: Default::default(),
        });
        let service = ReportService::new(
            generator,
            Arc::new(MemoryReportCache::new()),
            Utc.fix(),
            Duration::from_secs(60),
        );

        let tomorrow = (Utc::now() + ChronoDuration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        let err = service.daily_report(&tomorrow).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_generator() {
        let generator = Arc::new(FixedGenerator {
            report: sample_report(),
            calls: Default::default(),
        });
        let service = ReportService::new(
            generator.clone(),
            Arc::new(MemoryReportCache::new()),
            Utc.fix(),
            Duration::from_secs(60),
        );

        let first = service.daily_report("2024-01-01").await.unwrap();
        let second = service.daily_report("2024-01-01").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            generator.calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    struct BrokenCache;

    #[async_trait]
    impl crate::cache::ReportCache for BrokenCache {
        async fn get(&self, _key: &str) -> crate::cache::CacheResult<Option<String>> {
            Err(crate::cache::CacheError::Transport("down".to_string()))
        }

        async fn set(
            &self,
            _key: &str,
            _payload: &str,
            _ttl: Duration,
        ) -> crate::cache::CacheResult<()> {
            Err(crate::cache::CacheError::Transport("down".to_string()))
        }

        async fn invalidate(&self, _key: &str) -> crate::cache::CacheResult<()> {
            Err(crate::cache::CacheError::Transport("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_cache_failures_degrade_to_recomputation() {
        // A broken cache must not fail the read: the get error is a
        // miss, the set error is swallowed, every call recomputes.
        let generator = Arc::new(FixedGenerator {
            report: sample_report(),
            calls: Default::default(),
        });
        let service = ReportService::new(
            generator.clone(),
            Arc::new(BrokenCache),
            Utc.fix(),
            Duration::from_secs(60),
        );

        let first = service.daily_report("2024-01-01").await.unwrap();
        let second = service.daily_report("2024-01-01").await.unwrap();

        assert_eq!(first, sample_report());
        assert_eq!(first, second);
        assert_eq!(
            generator.calls.load(std::sync::atomic::Ordering::SeqCst),
            2
        );
    }

    #[tokio::test]
    async fn test_not_found_day_is_not_cached() {
        struct EmptyGenerator;

        #[async_trait]
        impl ReportGenerator for EmptyGenerator {
            async fn generate(&self, date: NaiveDate) -> ServiceResult<DailyReport> {
                Err(ServiceError::NotFound(format!("no orders found for {date}")))
            }
        }

        let cache = Arc::new(MemoryReportCache::new());
        let service = ReportService::new(
            Arc::new(EmptyGenerator),
            cache.clone(),
            Utc.fix(),
            Duration::from_secs(60),
        );

        let err = service.daily_report("2024-01-01").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(
            cache.get("daily-report:2024-01-01").await.unwrap(),
            None
        );
    }
}
