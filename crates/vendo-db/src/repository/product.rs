//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD operations
//! - Batch lookup for order validation (one query, not N)
//! - Guarded batch stock decrements
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: unconditional write (check-then-act race)                   │
//! │     UPDATE products SET quantity = 2 WHERE id = ?                      │
//! │                                                                         │
//! │     Request A: reads qty 5, orders 3 ──┐                               │
//! │     Request B: reads qty 5, orders 3 ──┤ both pass the check,          │
//! │                                        └─ stock ends up at -1          │
//! │                                                                         │
//! │  ✅ CORRECT: conditional decrement                                     │
//! │     UPDATE products SET quantity = quantity - 3                        │
//! │     WHERE id = ? AND quantity >= 3                                     │
//! │                                                                         │
//! │     The second writer affects zero rows; the whole batch rolls back    │
//! │     and the conflict is reported with the live quantity.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendo_core::{CatalogWriteError, PersistenceError, Product, ProductCatalog, QuantityUpdate};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Batch lookup for an order request
/// let products = repo.find_all_by_ids(&ids).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    price_cents: i64,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            price_cents: row.price_cents,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, sku, name, price_cents, quantity, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, sku, name, price_cents, quantity, created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Batch-fetches products for the given ids in a single query.
    ///
    /// ## Why One Query?
    /// An order request can carry many lines; N individual lookups would
    /// turn validation into N round trips. One `IN (...)` query amortizes
    /// the cost.
    ///
    /// ## Semantics
    /// Ids that match nothing are simply absent from the result; the
    /// caller decides what absence means.
    pub async fn find_all_by_ids(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Batch product lookup");

        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, sku, name, price_cents, quantity, created_at, updated_at \
             FROM products WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Applies a batch of stock updates in one transaction, all-or-nothing.
    ///
    /// Each product row takes a conditional decrement: the write only goes
    /// through while at least the ordered quantity remains, so a concurrent
    /// order cannot take the stock negative. On the first failed guard the
    /// live quantity is read, the transaction rolls back and the conflict
    /// is reported.
    ///
    /// ## Returns
    /// * `Ok(())` - Every decrement applied
    /// * `Err(DbError::StockConflict)` - A guard failed; nothing was changed
    pub async fn update_quantities(&self, updates: &[QuantityUpdate]) -> DbResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        debug!(count = updates.len(), "Applying stock updates");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#,
            )
            .bind(&update.product_id)
            .bind(update.ordered)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Guard failed: someone took the stock first (a missing
                // row reads as zero availability).
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
                        .bind(&update.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                tx.rollback().await?;

                debug!(product_id = %update.product_id, "Stock conflict, batch rolled back");
                return Err(DbError::StockConflict {
                    product_id: update.product_id.clone(),
                    available: available.unwrap_or(0),
                });
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, price_cents, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, sku, name, price_cents, quantity, created_at, updated_at
            FROM products
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Port Implementation
// =============================================================================

/// The repository doubles as the core's catalog collaborator.
#[async_trait::async_trait]
impl ProductCatalog for ProductRepository {
    async fn find_all_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, PersistenceError> {
        ProductRepository::find_all_by_ids(self, ids)
            .await
            .map_err(PersistenceError::from)
    }

    async fn update_quantities(&self, updates: &[QuantityUpdate]) -> Result<(), CatalogWriteError> {
        match ProductRepository::update_quantities(self, updates).await {
            Ok(()) => Ok(()),
            Err(DbError::StockConflict {
                product_id,
                available,
            }) => Err(CatalogWriteError::StockConflict {
                product_id,
                available,
            }),
            Err(err) => Err(CatalogWriteError::Persistence(PersistenceError::new(err))),
        }
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
