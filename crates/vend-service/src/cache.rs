//! # Report Cache
//!
//! Cache-aside storage for rendered daily reports.
//!
//! ## Read/Write Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Cache Protocol                            │
//! │                                                                         │
//! │  READ   get("daily-report:2024-01-01")                                 │
//! │           ├─ hit  ──► cached JSON payload, returned verbatim            │
//! │           ├─ miss ──► caller regenerates and calls set                  │
//! │           └─ error ─► treated as a miss, never fails the read           │
//! │                                                                         │
//! │  WRITE  set(key, payload, ttl) replaces wholesale, no partial merge     │
//! │  DROP   invalidate(key) is idempotent; absent key is a success          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cached values are JSON strings, not domain structs, so a hit costs no
//! recomputation and the cache layer needs no knowledge of report shape.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Cache transport/payload failures.
///
/// These never surface to service callers; reads degrade to a miss and
/// writes are logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache transport failed: {0}")]
    Transport(String),

    #[error("cache payload invalid: {0}")]
    Payload(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache key for a report day. One bucket per calendar date.
pub fn report_cache_key(date: NaiveDate) -> String {
    format!("daily-report:{}", date.format("%Y-%m-%d"))
}

/// Storage seam for cached report payloads.
///
/// Object-safe so services can hold `Arc<dyn ReportCache>` and tests can
/// substitute counting fakes.
#[async_trait]
pub trait ReportCache: Send + Sync {
    /// Returns the cached payload, or `None` on miss or expiry.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a payload, replacing any previous value under the key.
    async fn set(&self, key: &str, payload: &str, ttl: Duration) -> CacheResult<()>;

    /// Drops a key. Succeeds whether or not the key was present.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

struct Entry {
    payload: String,
    stored_at: Instant,
    ttl: Duration,
}

/// In-process report cache.
///
/// Entries expire lazily on read. Good enough for a single-process
/// deployment; the trait is the seam if a shared store ever replaces it.
pub struct MemoryReportCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryReportCache {
    pub fn new() -> Self {
        MemoryReportCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Transport("cache lock poisoned".to_string()))
    }
}

impl Default for MemoryReportCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportCache for MemoryReportCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.lock()?;

        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < entry.ttl => {
                Ok(Some(entry.payload.clone()))
            }
            Some(_) => {
                // Expired; evict on the way out.
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, payload: &str, ttl: Duration) -> CacheResult<()> {
        let mut entries = self.lock()?;
        entries.insert(
            key.to_string(),
            Entry {
                payload: payload.to_string(),
                stored_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut entries = self.lock()?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(report_cache_key(date), "daily-report:2024-01-05");
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let cache = MemoryReportCache::new();
        cache
            .set("k", r#"{"a":1}"#, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("k").await.unwrap(),
            Some(r#"{"a":1}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = MemoryReportCache::new();
        cache.set("k", "v", Duration::from_millis(0)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_wholesale() {
        let cache = MemoryReportCache::new();
        cache.set("k", "old", Duration::from_secs(60)).await.unwrap();
        cache.set("k", "new", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let cache = MemoryReportCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();
        cache.invalidate("k").await.unwrap();
        cache.invalidate("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
