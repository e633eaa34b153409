//! # Repository Module
//!
//! Database repository implementations for Vendo.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  OrderService (vendo-core)                                             │
//! │       │                                                                 │
//! │       │  catalog.find_all_by_ids(&ids)                                 │
//! │       │  ↓ (through the ProductCatalog port)                           │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── find_all_by_ids(&self, ids)                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── update_quantities(&self, updates)                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Each repository also implements its vendo-core port trait, so the    │
//! │  core can be handed an `Arc<ProductRepository>` directly.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer records (implements `CustomerDirectory`)
//! - [`product::ProductRepository`] - Product catalog and stock (implements `ProductCatalog`)
//! - [`order::OrderRepository`] - Orders and line items (implements `OrderStore`)

pub mod customer;
pub mod order;
pub mod product;
