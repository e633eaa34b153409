//! # Domain Types
//!
//! Core domain types used throughout Vendo.
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
//! │  │  name           │   │  sku (business) │   │  customer_id    │       │
//! │  │  email          │   │  price_cents    │   │  lines          │       │
//! │  └─────────────────┘   │  quantity       │   └────────┬────────┘       │
//! │                        └─────────────────┘            │                │
//! │                                                       ▼                │
//! │  ┌──────────────────┐  ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ OrderLineRequest │  │ QuantityUpdate  │   │   OrderLine     │       │
//! │  │  ──────────────  │  │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id      │  │  product_id     │   │  product_id     │       │
//! │  │  quantity        │  │  ordered        │   │  quantity       │       │
//! │  │  (caller input)  │  │  new_quantity   │   │  unit_price ❄   │       │
//! │  └──────────────────┘  └─────────────────┘   └─────────────────┘       │
//! │                                               ❄ = frozen snapshot      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every stored entity has an `id`: UUID v4 as String - immutable, used for
//! database relations. Products additionally carry a human-readable `sku`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer who can place orders.
///
/// The order-creation flow only consumes existence; name and email are
/// maintained by catalog management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact email - unique per customer.
    pub email: String,

    /// When the customer was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with limited stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique per product.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Current unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Stock on hand.
    pub quantity: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the current price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the product can cover the requested quantity.
    #[inline]
    pub fn has_stock(&self, requested: i64) -> bool {
        self.quantity >= requested
    }
}

// =============================================================================
// Order Line Request
// =============================================================================

/// One line of a caller's order request: which product and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    /// Product UUID to order.
    pub product_id: String,

    /// Requested quantity (must be positive).
    pub quantity: i64,
}

// =============================================================================
// New Order (input to the order store)
// =============================================================================

/// An order ready to be persisted: validated, with prices already frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Owning customer UUID.
    pub customer_id: String,

    /// Snapshot line items, one per requested line.
    pub lines: Vec<NewOrderLine>,
}

/// A line item to persist. The unit price was captured during validation
/// and stays fixed no matter what happens to the catalog price later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    /// Product UUID this line refers to.
    pub product_id: String,

    /// Ordered quantity.
    pub quantity: i64,

    /// Unit price in cents at validation time (frozen).
    pub unit_price_cents: i64,
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order with its stored line items.
///
/// Created once, atomically with its lines, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sums the line totals.
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }
}

/// A stored line item.
/// Uses the snapshot pattern to freeze the unit price at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price in cents at order time (frozen).
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Quantity Update
// =============================================================================

/// One entry of the batch inventory update that follows order persistence.
///
/// `new_quantity` is the pre-order stock minus the ordered total; `ordered`
/// is the decrement the catalog must apply conditionally (only while at
/// least `ordered` units remain), so a concurrent order cannot drive the
/// stock negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    /// Product UUID to update.
    pub product_id: String,

    /// Total quantity taken by the order across all of its lines.
    pub ordered: i64,

    /// Stock the product should hold after the update.
    pub new_quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, quantity: i64, unit_price_cents: i64) -> OrderLine {
        OrderLine {
            id: "11111111-1111-4111-8111-111111111111".to_string(),
            order_id: "22222222-2222-4222-8222-222222222222".to_string(),
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_stock() {
        let product = Product {
            id: "33333333-3333-4333-8333-333333333333".to_string(),
            sku: "COKE-330".to_string(),
            name: "Coca-Cola 330ml".to_string(),
            price_cents: 199,
            quantity: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.has_stock(1));
        assert!(product.has_stock(5));
        assert!(!product.has_stock(6));
    }

    #[test]
    fn test_line_total() {
        let line = line("p", 3, 299);
        assert_eq!(line.unit_price().cents(), 299);
        assert_eq!(line.line_total().cents(), 897);
    }

    #[test]
    fn test_order_total_sums_lines() {
        let order = Order {
            id: "44444444-4444-4444-8444-444444444444".to_string(),
            customer_id: "55555555-5555-4555-8555-555555555555".to_string(),
            lines: vec![line("a", 2, 1000), line("b", 1, 550)],
            created_at: Utc::now(),
        };

        assert_eq!(order.total().cents(), 2550);
    }
}
