//! # Collaborator Ports
//!
//! Abstract contracts for the three storage collaborators the order flow
//! depends on. The core never sees an implementation; `vendo-db` provides
//! SQLite-backed adapters and the tests provide in-memory fakes.

use async_trait::async_trait;

use crate::error::{CatalogWriteError, PersistenceError};
use crate::types::{Customer, NewOrder, Order, Product, QuantityUpdate};

/// Port for customer lookup.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Finds a customer by id. `None` means no record matches.
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, PersistenceError>;
}

/// Port for product catalog access.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Batch-fetches products for the given ids in a single call.
    ///
    /// Neither order nor completeness of the result is guaranteed; a
    /// requested id absent from the result means "not found".
    async fn find_all_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, PersistenceError>;

    /// Applies a batch of stock updates, all-or-nothing.
    ///
    /// Each entry must be applied conditionally: the decrement only goes
    /// through while the product still holds at least `ordered` units.
    /// A lost race reports `CatalogWriteError::StockConflict` and leaves
    /// every quantity in the batch untouched.
    async fn update_quantities(&self, updates: &[QuantityUpdate]) -> Result<(), CatalogWriteError>;
}

/// Port for order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order together with its line items as a single
    /// creation and returns the stored order with server-assigned ids.
    async fn create(&self, order: NewOrder) -> Result<Order, PersistenceError>;
}
