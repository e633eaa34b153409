//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Creation                                    │
//! │                                                                         │
//! │  create(NewOrder)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                     │
//! │       ├── INSERT INTO orders                                           │
//! │       ├── INSERT INTO order_items   (one per line, frozen prices)      │
//! │       └── COMMIT                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Order { id, customer_id, lines, created_at }                          │
//! │                                                                         │
//! │  The order and its lines land atomically; there is no path that        │
//! │  persists one without the other.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `unit_price_cents` on a line item is the price captured during order
//! validation. Later catalog price changes never touch stored lines.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vendo_core::{NewOrder, Order, OrderLine, OrderStore, PersistenceError};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    product_id: String,
    quantity: i64,
    unit_price_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderLine {
    fn from(row: OrderItemRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            created_at: row.created_at,
        }
    }
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists an order together with its line items in one transaction
    /// and returns the stored order with generated ids.
    ///
    /// ## Returns
    /// * `Ok(Order)` - Stored order
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown customer or product id
    pub async fn create(&self, order: NewOrder) -> DbResult<Order> {
        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(order_id = %order_id, customer_id = %order.customer_id, lines = order.lines.len(), "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&order_id)
        .bind(&order.customer_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let line_id = Uuid::new_v4().to_string();

            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&line_id)
            .bind(&order_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            lines.push(OrderLine {
                id: line_id,
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                created_at: now,
            });
        }

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            customer_id: order.customer_id,
            lines,
            created_at: now,
        })
    }

    /// Gets an order with its line items.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Order found
    /// * `Ok(None)` - Order not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, created_at
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

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Order {
            id: row.id,
            customer_id: row.customer_id,
            created_at: row.created_at,
            lines: items.into_iter().map(OrderLine::from).collect(),
        }))
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = self.get_by_id(&id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
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
// Port Implementation
// =============================================================================

/// The repository doubles as the core's order persistence collaborator.
#[async_trait::async_trait]
impl OrderStore for OrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, PersistenceError> {
        OrderRepository::create(self, order)
            .await
            .map_err(PersistenceError::from)
    }
}
