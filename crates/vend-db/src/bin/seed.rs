//! # Seed Data Generator
//!
//! Populates the database with test customers, products, and orders for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p vend-db --bin seed
//!
//! # Custom order count and database path
//! cargo run -p vend-db --bin seed -- --orders 200 --db ./data/vend.db
//! ```
//!
//! Orders are spread over the last 30 days so the daily report has
//! something to chew on from day one.

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;
use vend_core::{order_total, Order, Product};
use vend_db::repository::customer::new_customer;
use vend_db::repository::product::new_product;
use vend_db::{Database, DbConfig};

const CUSTOMERS: &[(&str, &str, Option<&str>)] = &[
    ("Ada Lovelace", "ada@example.com", Some("+1-555-0100")),
    ("Grace Hopper", "grace@example.com", Some("+1-555-0101")),
    ("Alan Turing", "alan@example.com", None),
    ("Margaret Hamilton", "margaret@example.com", Some("+1-555-0103")),
    ("Dennis Ritchie", "dennis@example.com", None),
    ("Barbara Liskov", "barbara@example.com", Some("+1-555-0105")),
    ("Donald Knuth", "donald@example.com", None),
    ("Frances Allen", "frances@example.com", Some("+1-555-0107")),
];

const PRODUCTS: &[(&str, i64)] = &[
    ("Espresso", 350),
    ("Cappuccino", 475),
    ("Flat White", 450),
    ("Cold Brew", 525),
    ("Croissant", 395),
    ("Blueberry Muffin", 425),
    ("Bagel with Cream Cheese", 550),
    ("Avocado Toast", 895),
    ("House Blend 12oz Bag", 1499),
    ("Single Origin 12oz Bag", 1899),
    ("Travel Mug", 2250),
    ("Gift Card $10", 1000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut order_count: usize = 100;
    let mut db_path = String::from("./vend_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(100);
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
                println!("Vend Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of orders to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: ./vend_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vend Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", order_count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.orders().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} orders", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Inserting customers and products...");

    let mut customers = Vec::new();
    for (name, email, phone) in CUSTOMERS {
        let customer = new_customer(name, email, *phone);
        db.customers().insert(&customer).await?;
        customers.push(customer);
    }

    let mut products = Vec::new();
    for (name, price_cents) in PRODUCTS {
        let product = new_product(name, *price_cents);
        db.products().insert(&product).await?;
        products.push(product);
    }

    println!(
        "✓ Inserted {} customers, {} products",
        customers.len(),
        products.len()
    );

    println!();
    println!("Generating orders...");

    let start = std::time::Instant::now();
    let now = Utc::now();

    for seed in 0..order_count {
        let customer = &customers[seed % customers.len()];

        // 1 to 4 lines per order, duplicates allowed
        let line_count = 1 + (seed * 7) % 4;
        let lines: Vec<Product> = (0..line_count)
            .map(|n| products[(seed * 13 + n * 5) % products.len()].clone())
            .collect();

        let total = order_total(&lines);
        let timestamp = now - Duration::days((seed % 30) as i64)
            - Duration::minutes((seed * 37 % 720) as i64);
        let created = Utc::now();

        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            product_ids: lines.iter().map(|p| p.id.clone()).collect(),
            total_price_cents: total.cents(),
            timestamp,
            created_at: created,
            updated_at: created,
        };

        db.orders().insert(&order).await?;

        if (seed + 1) % 50 == 0 {
            println!("  Generated {} orders...", seed + 1);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} orders in {:?}", order_count, elapsed);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
