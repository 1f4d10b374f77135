//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operation: Batched Set Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The reference validator resolves every product reference of an         │
//! │  order with ONE query:                                                  │
//! │                                                                         │
//! │  requested ids: {P1, P2, P3}                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM products WHERE id IN (?1, ?2, ?3)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fetched: [P1, P3]   →  |fetched| != |requested|  →  at least one       │
//! │                         id is absent (the count check cannot say        │
//! │                         which one; callers re-resolve for diagnostics)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vend_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets all products whose ID is in the given set, in one query.
    ///
    /// Returns only the matches; the caller compares counts to detect
    /// unresolved identifiers. Order of the result is unspecified.
    pub async fn get_by_ids(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Batch-fetching products");

        // SQLite has no array binding; build the placeholder list at
        // runtime and bind each id.
        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT id, name, price_cents, created_at, updated_at \
             FROM products WHERE id IN ({placeholders})"
        );

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let products = query.fetch_all(&self.pool).await?;
        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all products, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to build a new product with a generated ID.
pub fn new_product(name: &str, price_cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        price_cents,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = new_product("Widget", 1099);
        repo.insert(&product).await.unwrap();

        let found = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Widget");
        assert_eq!(found.price_cents, 1099);
    }

    #[tokio::test]
    async fn test_get_by_ids_returns_only_matches() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let p1 = new_product("Widget", 1000);
        let p2 = new_product("Gadget", 500);
        repo.insert(&p1).await.unwrap();
        repo.insert(&p2).await.unwrap();

        let requested = vec![
            p1.id.clone(),
            p2.id.clone(),
            Uuid::new_v4().to_string(), // absent
        ];
        let fetched = repo.get_by_ids(&requested).await.unwrap();

        // Only matches come back; the count mismatch is the caller's signal.
        assert_eq!(fetched.len(), 2);
        assert_ne!(fetched.len(), requested.len());
    }

    #[tokio::test]
    async fn test_get_by_ids_empty_set() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let fetched = repo.get_by_ids(&[]).await.unwrap();
        assert!(fetched.is_empty());
    }
}
