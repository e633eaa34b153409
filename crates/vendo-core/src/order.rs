//! # Order Creation
//!
//! The order-creation service: validates a request against customer and
//! inventory state and, when valid, persists a price-snapshotted order and
//! decrements stock.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order Creation Pipeline                             │
//! │                                                                         │
//! │  CreateOrderRequest                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. VALIDATE REQUEST        (shape only, no collaborator calls)        │
//! │       │  └── InvalidRequest                                            │
//! │       ▼                                                                 │
//! │  2. VALIDATE CUSTOMER       CustomerDirectory::find_by_id              │
//! │       │  └── CustomerNotFound                                          │
//! │       ▼                                                                 │
//! │  3. RECONCILE STOCK         ProductCatalog::find_all_by_ids (1 call)   │
//! │       │  ├── NoProductsFound      (lookup matched nothing)             │
//! │       │  ├── ProductsNotFound     (ALL missing ids, request order)     │
//! │       │  └── InsufficientStock    (ALL shortfalls, not just first)     │
//! │       ▼                                                                 │
//! │  4. ASSEMBLE ORDER          OrderStore::create (snapshot prices)       │
//! │       │                     ProductCatalog::update_quantities          │
//! │       │  └── Persistence / InsufficientStock (lost decrement race)     │
//! │       ▼                                                                 │
//! │  Order (stored, with server-assigned line items)                       │
//! │                                                                         │
//! │  Any failure is terminal for the request; control never branches back. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exhaustive validation
//! Step 3's missing-product and shortfall checks collect *every* violation
//! before failing, so a caller correcting a bulk request gets the complete
//! picture in one round trip.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CatalogWriteError, OrderError, OrderResult, PersistenceError, StockShortfall};
use crate::ports::{CustomerDirectory, OrderStore, ProductCatalog};
use crate::types::{
    Customer, NewOrder, NewOrderLine, Order, OrderLineRequest, Product, QuantityUpdate,
};
use crate::validation::{validate_line_count, validate_quantity, validate_uuid};

// =============================================================================
// Request
// =============================================================================

/// A caller's request to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Customer placing the order.
    pub customer_id: String,

    /// Requested lines. Duplicate product ids are allowed; they count
    /// against the same stock and are persisted as separate lines.
    pub lines: Vec<OrderLineRequest>,
}

/// A requested line paired with the catalog record it resolved to.
///
/// `product.quantity` is the pre-order stock captured at validation time;
/// the inventory update is computed from it, never re-read.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub requested: OrderLineRequest,
    pub product: Product,
}

// =============================================================================
// Order Service
// =============================================================================

/// Drives order creation against the three storage collaborators.
///
/// Collaborators are injected through their port traits, so the service
/// never depends on a concrete storage implementation.
pub struct OrderService {
    customers: Arc<dyn CustomerDirectory>,
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    /// Creates a new OrderService over the given collaborators.
    pub fn new(
        customers: Arc<dyn CustomerDirectory>,
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        OrderService {
            customers,
            catalog,
            orders,
        }
    }

    /// Creates an order for a customer against the product catalog.
    ///
    /// ## Sequence
    /// 1. Validate the request shape (no collaborator calls yet)
    /// 2. Confirm the customer exists
    /// 3. Resolve every requested product and check stock, exhaustively
    /// 4. Persist the order with frozen unit prices, then decrement stock
    ///
    /// ## Failure semantics
    /// Validation failures abort before anything is persisted. Collaborator
    /// failures during step 4 surface unmodified; the core neither retries
    /// nor compensates.
    pub async fn create_order(&self, request: CreateOrderRequest) -> OrderResult<Order> {
        debug!(
            customer_id = %request.customer_id,
            lines = request.lines.len(),
            "create_order"
        );

        Self::validate_request(&request)?;

        let customer = self.validate_customer(&request.customer_id).await?;
        let resolved = self.reconcile_stock(&request.lines).await?;
        let order = self.assemble_order(&customer, &resolved).await?;

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            lines = order.lines.len(),
            total = %order.total(),
            "order created"
        );

        Ok(order)
    }

    /// Shape checks that need no collaborator: id formats, positive and
    /// bounded quantities, bounded line count.
    fn validate_request(request: &CreateOrderRequest) -> OrderResult<()> {
        validate_uuid(&request.customer_id, "customer_id")?;
        validate_line_count(request.lines.len())?;

        for line in &request.lines {
            validate_uuid(&line.product_id, "product_id")?;
            validate_quantity(line.quantity)?;
        }

        Ok(())
    }

    /// Confirms the requesting customer exists. No side effects.
    async fn validate_customer(&self, customer_id: &str) -> OrderResult<Customer> {
        self.customers
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| OrderError::CustomerNotFound(customer_id.to_string()))
    }

    /// Resolves the requested lines against the catalog and checks stock.
    ///
    /// One batch fetch for the distinct ids; then two exhaustive passes:
    /// first every missing product, then every insufficient quantity.
    /// Duplicate lines for one product are summed before the comparison -
    /// two lines must not split one product's availability.
    async fn reconcile_stock(
        &self,
        requested: &[OrderLineRequest],
    ) -> OrderResult<Vec<ResolvedLine>> {
        // Distinct ids, first-occurrence order preserved so error payloads
        // come back in request order.
        let mut ids: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for line in requested {
            if seen.insert(line.product_id.as_str()) {
                ids.push(line.product_id.clone());
            }
        }

        let found = self.catalog.find_all_by_ids(&ids).await?;
        if found.is_empty() {
            return Err(OrderError::NoProductsFound);
        }

        let by_id: HashMap<&str, &Product> =
            found.iter().map(|p| (p.id.as_str(), p)).collect();

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !by_id.contains_key(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            debug!(missing = missing.len(), "requested products not in catalog");
            return Err(OrderError::ProductsNotFound(missing));
        }

        // Requested totals per product; duplicate lines count together.
        let mut totals: HashMap<&str, i64> = HashMap::new();
        for line in requested {
            *totals.entry(line.product_id.as_str()).or_insert(0) += line.quantity;
        }

        let mut shortfalls: Vec<StockShortfall> = Vec::new();
        for id in &ids {
            let product = by_id[id.as_str()];
            let requested_total = totals[id.as_str()];
            if !product.has_stock(requested_total) {
                shortfalls.push(StockShortfall {
                    product_id: product.id.clone(),
                    requested: requested_total,
                    available: product.quantity,
                });
            }
        }
        if !shortfalls.is_empty() {
            debug!(shortfalls = shortfalls.len(), "insufficient stock");
            return Err(OrderError::InsufficientStock(shortfalls));
        }

        Ok(requested
            .iter()
            .map(|line| ResolvedLine {
                requested: line.clone(),
                product: by_id[line.product_id.as_str()].clone(),
            })
            .collect())
    }

    /// Persists the order with frozen prices, then submits the batch
    /// inventory update computed from the stored lines and the pre-order
    /// quantities captured during reconciliation.
    async fn assemble_order(
        &self,
        customer: &Customer,
        resolved: &[ResolvedLine],
    ) -> OrderResult<Order> {
        // Snapshot pattern: the unit price comes from the record resolved
        // during reconciliation, not a re-fetch, fixing the price at
        // validation time.
        let lines: Vec<NewOrderLine> = resolved
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product.id.clone(),
                quantity: line.requested.quantity,
                unit_price_cents: line.product.price_cents,
            })
            .collect();

        let stored = self
            .orders
            .create(NewOrder {
                customer_id: customer.id.clone(),
                lines,
            })
            .await?;

        // Pre-order quantities observed during reconciliation.
        let mut available: HashMap<&str, i64> = HashMap::new();
        for line in resolved {
            available.insert(line.product.id.as_str(), line.product.quantity);
        }

        // One update entry per product, aggregated over the stored lines.
        let mut updates: Vec<QuantityUpdate> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for line in &stored.lines {
            let Some(&before) = available.get(line.product_id.as_str()) else {
                return Err(OrderError::Persistence(PersistenceError::new(format!(
                    "order store returned a line for unresolved product {}",
                    line.product_id
                ))));
            };

            match index.get(line.product_id.as_str()) {
                Some(&at) => {
                    updates[at].ordered += line.quantity;
                    updates[at].new_quantity -= line.quantity;
                }
                None => {
                    index.insert(line.product_id.as_str(), updates.len());
                    updates.push(QuantityUpdate {
                        product_id: line.product_id.clone(),
                        ordered: line.quantity,
                        new_quantity: before - line.quantity,
                    });
                }
            }
        }

        match self.catalog.update_quantities(&updates).await {
            Ok(()) => Ok(stored),
            Err(CatalogWriteError::StockConflict {
                product_id,
                available,
            }) => {
                // A concurrent order took the stock between reconciliation
                // and the guarded decrement.
                let requested = updates
                    .iter()
                    .find(|update| update.product_id == product_id)
                    .map(|update| update.ordered)
                    .unwrap_or(0);
                Err(OrderError::InsufficientStock(vec![StockShortfall {
                    product_id,
                    requested,
                    available,
                }]))
            }
            Err(CatalogWriteError::Persistence(err)) => Err(OrderError::Persistence(err)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderLine;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    const CUSTOMER: &str = "aaaaaaaa-0000-4000-8000-000000000001";
    const P1: &str = "bbbbbbbb-0000-4000-8000-000000000001";
    const P2: &str = "bbbbbbbb-0000-4000-8000-000000000002";
    const P3: &str = "bbbbbbbb-0000-4000-8000-000000000003";

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    fn product(id: &str, price_cents: i64, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{}", &id[id.len() - 4..]),
            name: "Test Product".to_string(),
            price_cents,
            quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(product_id: &str, quantity: i64) -> OrderLineRequest {
        OrderLineRequest {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    struct FakeDirectory {
        customers: Vec<Customer>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CustomerDirectory for FakeDirectory {
        async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, PersistenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.customers.iter().find(|c| c.id == id).cloned())
        }
    }

    struct FakeCatalog {
        products: Mutex<Vec<Product>>,
        find_calls: AtomicUsize,
        update_calls: AtomicUsize,
        /// Product id whose guarded decrement should report a lost race.
        conflict_on: Option<String>,
    }

    #[async_trait]
    impl ProductCatalog for FakeCatalog {
        async fn find_all_by_ids(
            &self,
            ids: &[String],
        ) -> Result<Vec<Product>, PersistenceError> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            let products = self.products.lock().unwrap();
            Ok(products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }

        async fn update_quantities(
            &self,
            updates: &[QuantityUpdate],
        ) -> Result<(), CatalogWriteError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let mut products = self.products.lock().unwrap();

            if let Some(conflict_id) = &self.conflict_on {
                if let Some(update) = updates.iter().find(|u| &u.product_id == conflict_id) {
                    let available = products
                        .iter()
                        .find(|p| p.id == update.product_id)
                        .map(|p| p.quantity)
                        .unwrap_or(0);
                    return Err(CatalogWriteError::StockConflict {
                        product_id: update.product_id.clone(),
                        available,
                    });
                }
            }

            for update in updates {
                if let Some(p) = products.iter_mut().find(|p| p.id == update.product_id) {
                    p.quantity = update.new_quantity;
                }
            }
            Ok(())
        }
    }

    struct FakeStore {
        orders: Mutex<Vec<Order>>,
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl OrderStore for FakeStore {
        async fn create(&self, order: NewOrder) -> Result<Order, PersistenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PersistenceError::new("order store unavailable"));
            }

            let order_id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            let lines = order
                .lines
                .iter()
                .map(|l| OrderLine {
                    id: uuid::Uuid::new_v4().to_string(),
                    order_id: order_id.clone(),
                    product_id: l.product_id.clone(),
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                    created_at: now,
                })
                .collect();

            let stored = Order {
                id: order_id,
                customer_id: order.customer_id,
                lines,
                created_at: now,
            };
            self.orders.lock().unwrap().push(stored.clone());
            Ok(stored)
        }
    }

    struct Harness {
        directory: Arc<FakeDirectory>,
        catalog: Arc<FakeCatalog>,
        store: Arc<FakeStore>,
        service: OrderService,
    }

    fn harness(customers: Vec<Customer>, products: Vec<Product>) -> Harness {
        harness_with(customers, products, None, false)
    }

    fn harness_with(
        customers: Vec<Customer>,
        products: Vec<Product>,
        conflict_on: Option<String>,
        fail_store: bool,
    ) -> Harness {
        let directory = Arc::new(FakeDirectory {
            customers,
            calls: AtomicUsize::new(0),
        });
        let catalog = Arc::new(FakeCatalog {
            products: Mutex::new(products),
            find_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            conflict_on,
        });
        let store = Arc::new(FakeStore {
            orders: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: fail_store,
        });

        let service = OrderService::new(directory.clone(), catalog.clone(), store.clone());
        Harness {
            directory,
            catalog,
            store,
            service,
        }
    }

    fn request(lines: Vec<OrderLineRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: CUSTOMER.to_string(),
            lines,
        }
    }

    // -------------------------------------------------------------------------
    // Request validation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn rejects_non_positive_quantity_before_any_lookup() {
        let h = harness(vec![customer(CUSTOMER)], vec![product(P1, 1000, 5)]);

        let err = h
            .service
            .create_order(request(vec![line(P1, 0)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidRequest(_)));
        assert_eq!(h.directory.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.catalog.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_malformed_product_id() {
        let h = harness(vec![customer(CUSTOMER)], vec![]);

        let err = h
            .service
            .create_order(request(vec![line("not-a-uuid", 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidRequest(_)));
    }

    // -------------------------------------------------------------------------
    // Customer validation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn unknown_customer_stops_before_catalog_and_store() {
        let h = harness(vec![], vec![product(P1, 1000, 5)]);

        let err = h
            .service
            .create_order(request(vec![line(P1, 1)]))
            .await
            .unwrap_err();

        match err {
            OrderError::CustomerNotFound(id) => assert_eq!(id, CUSTOMER),
            other => panic!("expected CustomerNotFound, got {other:?}"),
        }
        assert_eq!(h.catalog.find_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
    }

    // -------------------------------------------------------------------------
    // Stock reconciliation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn empty_catalog_result_is_no_products_found() {
        let h = harness(vec![customer(CUSTOMER)], vec![]);

        let err = h
            .service
            .create_order(request(vec![line(P1, 1), line(P2, 2)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::NoProductsFound));
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_products_reported_completely_in_request_order() {
        let h = harness(vec![customer(CUSTOMER)], vec![product(P2, 1000, 5)]);

        let err = h
            .service
            .create_order(request(vec![line(P1, 1), line(P2, 1), line(P3, 1)]))
            .await
            .unwrap_err();

        match err {
            OrderError::ProductsNotFound(ids) => {
                assert_eq!(ids, vec![P1.to_string(), P3.to_string()]);
            }
            other => panic!("expected ProductsNotFound, got {other:?}"),
        }
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn insufficient_stock_lists_exactly_the_offenders() {
        // P1 qty 5 price 10, P2 qty 0 price 20; request P1 x3, P2 x1 ->
        // only P2 offends.
        let h = harness(
            vec![customer(CUSTOMER)],
            vec![product(P1, 10, 5), product(P2, 20, 0)],
        );

        let err = h
            .service
            .create_order(request(vec![line(P1, 3), line(P2, 1)]))
            .await
            .unwrap_err();

        match err {
            OrderError::InsufficientStock(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].product_id, P2);
                assert_eq!(shortfalls[0].requested, 1);
                assert_eq!(shortfalls[0].available, 0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Nothing persisted, nothing decremented.
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.catalog.update_calls.load(Ordering::SeqCst), 0);
        let products = h.catalog.products.lock().unwrap();
        assert_eq!(products.iter().find(|p| p.id == P1).unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn duplicate_lines_share_one_products_availability() {
        // Two lines of 3 against a stock of 5 must not both pass.
        let h = harness(vec![customer(CUSTOMER)], vec![product(P1, 1000, 5)]);

        let err = h
            .service
            .create_order(request(vec![line(P1, 3), line(P1, 3)]))
            .await
            .unwrap_err();

        match err {
            OrderError::InsufficientStock(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].requested, 6);
                assert_eq!(shortfalls[0].available, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // Order assembly
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn successful_order_snapshots_price_and_decrements_stock() {
        // P1 qty 5 price 10; order x2 -> line {P1, qty 2, price 10},
        // catalog quantity becomes 3.
        let h = harness(vec![customer(CUSTOMER)], vec![product(P1, 10, 5)]);

        let order = h
            .service
            .create_order(request(vec![line(P1, 2)]))
            .await
            .unwrap();

        assert_eq!(order.customer_id, CUSTOMER);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].product_id, P1);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.lines[0].unit_price_cents, 10);
        assert!(!order.lines[0].id.is_empty());
        assert_eq!(order.total().cents(), 20);

        assert_eq!(h.catalog.update_calls.load(Ordering::SeqCst), 1);
        let products = h.catalog.products.lock().unwrap();
        assert_eq!(products.iter().find(|p| p.id == P1).unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn duplicate_lines_are_persisted_as_sent_but_decremented_once() {
        let h = harness(vec![customer(CUSTOMER)], vec![product(P1, 250, 5)]);

        let order = h
            .service
            .create_order(request(vec![line(P1, 2), line(P1, 1)]))
            .await
            .unwrap();

        // Lines mirror the request...
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.lines[1].quantity, 1);

        // ...while the stock update aggregates them.
        let products = h.catalog.products.lock().unwrap();
        assert_eq!(products.iter().find(|p| p.id == P1).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn price_snapshot_decoupled_from_later_price_change() {
        // The stored unit price comes from the reconciled record; assert
        // it is decoupled from whatever the catalog says afterwards.
        let h = harness(vec![customer(CUSTOMER)], vec![product(P1, 1099, 10)]);

        let order = h
            .service
            .create_order(request(vec![line(P1, 1)]))
            .await
            .unwrap();

        {
            let mut products = h.catalog.products.lock().unwrap();
            products.iter_mut().find(|p| p.id == P1).unwrap().price_cents = 9999;
        }

        let stored = h.store.orders.lock().unwrap();
        assert_eq!(stored[0].lines[0].unit_price_cents, 1099);
        assert_eq!(order.lines[0].unit_price_cents, 1099);
    }

    #[tokio::test]
    async fn lost_decrement_race_maps_to_insufficient_stock() {
        let h = harness_with(
            vec![customer(CUSTOMER)],
            vec![product(P1, 1000, 1)],
            Some(P1.to_string()),
            false,
        );

        let err = h
            .service
            .create_order(request(vec![line(P1, 1)]))
            .await
            .unwrap_err();

        match err {
            OrderError::InsufficientStock(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].product_id, P1);
                assert_eq!(shortfalls[0].requested, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_failure_propagates_and_skips_the_quantity_update() {
        let h = harness_with(
            vec![customer(CUSTOMER)],
            vec![product(P1, 1000, 5)],
            None,
            true,
        );

        let err = h
            .service
            .create_order(request(vec![line(P1, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Persistence(_)));
        assert_eq!(h.catalog.update_calls.load(Ordering::SeqCst), 0);
        let products = h.catalog.products.lock().unwrap();
        assert_eq!(products.iter().find(|p| p.id == P1).unwrap().quantity, 5);
    }
}
