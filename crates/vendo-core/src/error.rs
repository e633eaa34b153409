//! # Error Types
//!
//! Domain-specific error types for vendo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendo-core errors (this file)                                         │
//! │  ├── OrderError       - Order-creation request rejections              │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── PersistenceError - Opaque collaborator failure (port level)       │
//! │  └── CatalogWriteError- Quantity-update outcome (port level)           │
//! │                                                                         │
//! │  vendo-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        DbError ─► PersistenceError ─┴─► OrderError ─► caller           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Errors carry structured payloads (id lists, shortfall records);
//!    message strings are Display-only
//! 3. Every error is a request rejection, never a panic

use std::fmt;

use thiserror::Error;

// =============================================================================
// Stock Shortfall
// =============================================================================

/// One product whose requested quantity exceeded its availability.
///
/// Carried as structured data so callers can render their own messages;
/// the Display impl is for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    /// Product UUID that cannot cover the request.
    pub product_id: String,

    /// Total quantity the request asked for (duplicate lines summed).
    pub requested: i64,

    /// Stock observed when the request was checked.
    pub available: i64,
}

impl fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "product {} has less than {} units available ({} in stock)",
            self.product_id, self.requested, self.available
        )
    }
}

// =============================================================================
// Order Error
// =============================================================================

/// Order-creation rejections.
///
/// These errors represent business rule violations or collaborator failures.
/// The transport layer maps each kind to its own user-facing response.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request itself is malformed (bad id shape, non-positive
    /// quantity, too many lines). Rejected before any collaborator call.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// No customer matches the given id.
    #[error("no customer matching id {0}")]
    CustomerNotFound(String),

    /// The catalog lookup for the requested ids returned nothing at all.
    ///
    /// ## When This Occurs
    /// - Every requested id is unknown to the catalog
    /// - The request carried no lines
    #[error("no products found for the requested ids")]
    NoProductsFound,

    /// One or more requested product ids do not exist.
    /// Carries the complete list of missing ids, in request order.
    #[error("products not found: {}", .0.join(", "))]
    ProductsNotFound(Vec<String>),

    /// One or more requested quantities exceed available stock.
    /// Carries every offending product, not just the first.
    ///
    /// ## When This Occurs
    /// - A requested total is larger than the stock observed during
    ///   validation
    /// - A concurrent order took the stock between validation and the
    ///   inventory update (the guarded decrement lost the race)
    #[error("insufficient stock for {} product(s)", .0.len())]
    InsufficientStock(Vec<StockShortfall>),

    /// A storage collaborator failed. Not a business rule violation;
    /// surfaced as-is, never retried by the core.
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Convenience type alias for Results with OrderError.
pub type OrderResult<T> = Result<T, OrderError>;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a request doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Port-Level Errors
// =============================================================================

/// Failure inside a storage collaborator, carried through the core
/// untouched. Adapters convert their own error types into this.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PersistenceError(Box<dyn std::error::Error + Send + Sync>);

impl PersistenceError {
    /// Wraps any error type.
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        PersistenceError(source.into())
    }

    /// The wrapped collaborator error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync) {
        self.0.as_ref()
    }
}

/// Outcome of the batch quantity update.
///
/// The update is conditional: each decrement only applies while enough
/// stock remains, so concurrent orders cannot drive a quantity negative.
#[derive(Debug, Error)]
pub enum CatalogWriteError {
    /// The guarded decrement found less stock than the order reserved.
    /// `available` is the quantity the product held when the write failed.
    #[error("stock for product {product_id} changed before the update was applied ({available} left)")]
    StockConflict { product_id: String, available: i64 },

    /// Any other storage failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortfall_display() {
        let shortfall = StockShortfall {
            product_id: "p2".to_string(),
            requested: 5,
            available: 3,
        };
        assert_eq!(
            shortfall.to_string(),
            "product p2 has less than 5 units available (3 in stock)"
        );
    }

    #[test]
    fn test_order_error_messages() {
        let err = OrderError::CustomerNotFound("c1".to_string());
        assert_eq!(err.to_string(), "no customer matching id c1");

        let err = OrderError::ProductsNotFound(vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(err.to_string(), "products not found: p1, p2");

        let err = OrderError::InsufficientStock(vec![StockShortfall {
            product_id: "p1".to_string(),
            requested: 2,
            available: 0,
        }]);
        assert_eq!(err.to_string(), "insufficient stock for 1 product(s)");
    }

    #[test]
    fn test_validation_converts_to_order_error() {
        let validation_err = ValidationError::Required {
            field: "customer_id".to_string(),
        };
        let order_err: OrderError = validation_err.into();
        assert!(matches!(order_err, OrderError::InvalidRequest(_)));
    }

    #[test]
    fn test_persistence_error_wraps_source() {
        let err = PersistenceError::new("connection reset");
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(err.inner().to_string(), "connection reset");

        let order_err: OrderError = err.into();
        assert!(matches!(order_err, OrderError::Persistence(_)));
    }
}
