//! # vendo-core: Pure Business Logic for Vendo
//!
//! This crate is the **heart** of Vendo. It contains the order-creation
//! business logic as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendo Request Flow                               │
//! │                                                                         │
//! │  Caller (transport layer, not in this workspace)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ vendo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Service  │  │   rules   │  │   │
//! │  │   │   Order   │  │           │  │           │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ports (CustomerDirectory,              │
//! │                                │        ProductCatalog, OrderStore)     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vendo-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//! - [`ports`] - Abstract contracts for the storage collaborators
//! - [`order`] - The order-creation service
//!
//! ## Design Principles
//!
//! 1. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 2. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Ports and Adapters**: storage is reached only through the [`ports`] traits
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vendo_core::{CreateOrderRequest, OrderLineRequest, OrderService};
//!
//! let service = OrderService::new(customers, catalog, orders);
//!
//! let order = service
//!     .create_order(CreateOrderRequest {
//!         customer_id: customer_id.clone(),
//!         lines: vec![OrderLineRequest { product_id, quantity: 2 }],
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod ports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vendo_core::Money` instead of
// `use vendo_core::money::Money`

pub use error::{
    CatalogWriteError, OrderError, OrderResult, PersistenceError, StockShortfall, ValidationError,
};
pub use money::Money;
pub use order::{CreateOrderRequest, OrderService, ResolvedLine};
pub use ports::{CustomerDirectory, OrderStore, ProductCatalog};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single order request
///
/// ## Business Reason
/// Prevents runaway requests and keeps the batch catalog lookup bounded.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line in an order request
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
