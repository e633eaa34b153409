//! # Seed Data Generator
//!
//! Populates the database with demo customers and products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p vendo-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p vendo-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p vendo-db --bin seed -- --db ./data/vendo.db
//! ```
//!
//! ## Generated Data
//! - A handful of demo customers with unique emails
//! - Products across categories (beverages, snacks, grocery) with:
//!   - Unique SKU: `{CATEGORY}-{NAME}-{INDEX}`
//!   - Deterministic pseudo-random price: $0.99 - $9.99
//!   - Deterministic pseudo-random stock: 0 - 100

use chrono::Utc;
use std::env;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use vendo_core::{Customer, Product};
use vendo_db::repository::customer::generate_customer_id;
use vendo_db::repository::product::generate_product_id;
use vendo_db::{Database, DbConfig};

/// Product categories for realistic demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Coca-Cola 330ml",
            "Sparkling Water 500ml",
            "Orange Juice 1L",
            "Cold Brew Coffee",
            "Green Tea",
            "Lemonade",
        ],
    ),
    (
        "SNK",
        &[
            "Salted Chips",
            "Dark Chocolate Bar",
            "Trail Mix",
            "Oat Cookies",
            "Pretzels",
            "Gummy Bears",
        ],
    ),
    (
        "GRO",
        &[
            "Spaghetti 500g",
            "Basmati Rice 1kg",
            "Canned Tomatoes",
            "Olive Oil 750ml",
            "Peanut Butter",
            "Honey 350g",
        ],
    ),
];

/// Demo customers
const CUSTOMERS: &[(&str, &str)] = &[
    ("Ada Lovelace", "ada@example.com"),
    ("Grace Hopper", "grace@example.com"),
    ("Alan Turing", "alan@example.com"),
    ("Barbara Liskov", "barbara@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./vendo_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vendo Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./vendo_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Vendo Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database (runs migrations)
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing data
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Seed customers
    println!();
    println!("Seeding customers...");
    for (name, email) in CUSTOMERS {
        let customer = Customer {
            id: generate_customer_id(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        db.customers().insert(&customer).await?;
    }
    println!("✓ Seeded {} customers", CUSTOMERS.len());

    // Seed products
    println!();
    println!("Seeding products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for index in 0..count {
        let (category_code, names) = CATEGORIES[index % CATEGORIES.len()];
        let product_name = names[(index / CATEGORIES.len()) % names.len()];
        let product = generate_product(category_code, product_name, index, index * 7 + 13);

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.sku, e);
            continue;
        }

        generated += 1;

        if generated % 100 == 0 {
            println!("  Seeded {} products...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded {} products in {:?}", generated, elapsed);

    // Show a sample so the ids are easy to grab for manual testing
    println!();
    println!("Sample products:");
    for product in db.products().list(5).await? {
        println!(
            "  {}  {:<28} {}  (stock {})",
            product.id,
            product.name,
            product.price(),
            product.quantity
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(category: &str, name: &str, index: usize, seed: usize) -> Product {
    let now = Utc::now();

    // Unique SKU per generated row
    let short: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{}-{}-{:04}", category, short, index);

    // Price: $0.99 - $9.99
    let price_cents = 99 + ((seed * 37) % 900) as i64;

    // Stock: 0 - 100 (some products intentionally out of stock)
    let quantity = (seed % 101) as i64;

    Product {
        id: generate_product_id(),
        sku,
        name: name.to_string(),
        price_cents,
        quantity,
        created_at: now,
        updated_at: now,
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vendo_db=trace` - Show trace for the db crate only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vendo_db=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
