//! Repository-level tests over an in-memory SQLite database: constraint
//! mapping, batch lookup semantics and the guarded decrement batch.

use chrono::Utc;
use uuid::Uuid;

use vendo_core::{Customer, NewOrder, NewOrderLine, Product, QuantityUpdate};
use vendo_db::{Database, DbConfig, DbError};

async fn database() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn customer(email: &str) -> Customer {
    Customer {
        id: Uuid::new_v4().to_string(),
        name: "Test Customer".to_string(),
        email: email.to_string(),
        created_at: Utc::now(),
    }
}

fn product(sku: &str, price_cents: i64, quantity: i64) -> Product {
    Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        name: "Test Product".to_string(),
        price_cents,
        quantity,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn customer_roundtrip_by_id_and_email() {
    let db = database().await;
    let inserted = db.customers().insert(&customer("ada@example.com")).await.unwrap();

    let by_id = db.customers().get_by_id(&inserted.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "ada@example.com");

    let by_email = db
        .customers()
        .get_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, inserted.id);

    assert!(db.customers().get_by_id("missing").await.unwrap().is_none());
    assert_eq!(db.customers().count().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_customer_email_is_a_unique_violation() {
    let db = database().await;
    db.customers().insert(&customer("dup@example.com")).await.unwrap();

    let err = db
        .customers()
        .insert(&customer("dup@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::UniqueViolation { .. }), "got {err:?}");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn duplicate_product_sku_is_a_unique_violation() {
    let db = database().await;
    db.products().insert(&product("SKU-1", 100, 5)).await.unwrap();

    let err = db
        .products()
        .insert(&product("SKU-1", 200, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::UniqueViolation { .. }), "got {err:?}");
}

#[tokio::test]
async fn find_all_by_ids_returns_only_matches() {
    let db = database().await;
    let p1 = db.products().insert(&product("SKU-1", 100, 5)).await.unwrap();
    let p2 = db.products().insert(&product("SKU-2", 200, 3)).await.unwrap();
    db.products().insert(&product("SKU-3", 300, 1)).await.unwrap();

    let unknown = Uuid::new_v4().to_string();
    let found = db
        .products()
        .find_all_by_ids(&[p1.id.clone(), p2.id.clone(), unknown])
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.iter().any(|p| p.id == p1.id));
    assert!(found.iter().any(|p| p.id == p2.id));

    let none = db.products().find_all_by_ids(&[]).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn update_quantities_applies_the_whole_batch() {
    let db = database().await;
    let p1 = db.products().insert(&product("SKU-1", 100, 5)).await.unwrap();
    let p2 = db.products().insert(&product("SKU-2", 200, 4)).await.unwrap();

    db.products()
        .update_quantities(&[
            QuantityUpdate {
                product_id: p1.id.clone(),
                ordered: 2,
                new_quantity: 3,
            },
            QuantityUpdate {
                product_id: p2.id.clone(),
                ordered: 4,
                new_quantity: 0,
            },
        ])
        .await
        .unwrap();

    assert_eq!(db.products().get_by_id(&p1.id).await.unwrap().unwrap().quantity, 3);
    assert_eq!(db.products().get_by_id(&p2.id).await.unwrap().unwrap().quantity, 0);
}

#[tokio::test]
async fn update_quantities_rolls_back_on_stock_conflict() {
    let db = database().await;
    let p1 = db.products().insert(&product("SKU-1", 100, 5)).await.unwrap();
    let p2 = db.products().insert(&product("SKU-2", 200, 1)).await.unwrap();

    // p1's decrement succeeds first, then p2's guard fails; the whole
    // batch must come back untouched.
    let err = db
        .products()
        .update_quantities(&[
            QuantityUpdate {
                product_id: p1.id.clone(),
                ordered: 2,
                new_quantity: 3,
            },
            QuantityUpdate {
                product_id: p2.id.clone(),
                ordered: 3,
                new_quantity: -2,
            },
        ])
        .await
        .unwrap_err();

    match err {
        DbError::StockConflict {
            product_id,
            available,
        } => {
            assert_eq!(product_id, p2.id);
            assert_eq!(available, 1);
        }
        other => panic!("expected StockConflict, got {other:?}"),
    }

    assert_eq!(db.products().get_by_id(&p1.id).await.unwrap().unwrap().quantity, 5);
    assert_eq!(db.products().get_by_id(&p2.id).await.unwrap().unwrap().quantity, 1);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn order_roundtrip_with_lines() {
    let db = database().await;
    let customer = db.customers().insert(&customer("buyer@example.com")).await.unwrap();
    let p1 = db.products().insert(&product("SKU-1", 100, 5)).await.unwrap();
    let p2 = db.products().insert(&product("SKU-2", 250, 5)).await.unwrap();

    let created = db
        .orders()
        .create(NewOrder {
            customer_id: customer.id.clone(),
            lines: vec![
                NewOrderLine {
                    product_id: p1.id.clone(),
                    quantity: 2,
                    unit_price_cents: 100,
                },
                NewOrderLine {
                    product_id: p2.id.clone(),
                    quantity: 1,
                    unit_price_cents: 250,
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(created.lines.len(), 2);
    assert!(created.lines.iter().all(|l| l.order_id == created.id));

    let fetched = db.orders().get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.customer_id, customer.id);
    assert_eq!(fetched.lines.len(), 2);
    assert_eq!(fetched.lines[0].product_id, p1.id);
    assert_eq!(fetched.lines[0].quantity, 2);
    assert_eq!(fetched.lines[1].product_id, p2.id);
    assert_eq!(fetched.lines[1].unit_price_cents, 250);
    assert_eq!(fetched.total().cents(), 450);

    let by_customer = db.orders().list_by_customer(&customer.id).await.unwrap();
    assert_eq!(by_customer.len(), 1);
    assert_eq!(by_customer[0].id, created.id);
}

#[tokio::test]
async fn order_for_unknown_customer_is_a_foreign_key_violation() {
    let db = database().await;
    let p1 = db.products().insert(&product("SKU-1", 100, 5)).await.unwrap();

    let err = db
        .orders()
        .create(NewOrder {
            customer_id: Uuid::new_v4().to_string(),
            lines: vec![NewOrderLine {
                product_id: p1.id,
                quantity: 1,
                unit_price_cents: 100,
            }],
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, DbError::ForeignKeyViolation { .. }),
        "got {err:?}"
    );
}
