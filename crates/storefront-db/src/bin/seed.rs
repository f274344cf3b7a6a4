//! # Demo Session Seeder
//!
//! Fills one shopper session with demo cart lines and a wishlist entry, then
//! prints what checkout would see.
//!
//! ## Usage
//! ```bash
//! # Seed the configured session (storefront.toml / STOREFRONT_* env)
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path and session
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db --session demo
//!
//! # Use a specific config file
//! cargo run -p storefront-db --bin seed -- --config ./storefront.toml
//! ```
//!
//! Without `--session`, `STOREFRONT_SESSION_ID` or `[session] id` in the
//! config file, every run generates a fresh session id and seeds a new
//! session. Pin the id to make a second run increment the same variants.

use std::env;
use std::path::PathBuf;

use storefront_core::{CartEngine, Money, Product, ProductSnapshot};
use storefront_db::{init_tracing, Database, SqliteSessionStore, StorefrontConfig};
use tracing::info;

/// Demo catalog: (id, name, price in cents, image, (size, color) picks)
const DEMO_LINES: &[(&str, &str, i64, &str, &[(&str, &str)])] = &[
    (
        "shirt1",
        "Oxford Shirt",
        2000,
        "shirt1.png",
        &[("M", "Blue"), ("M", "Blue"), ("L", "White")],
    ),
    ("jeans4", "Slim Jeans", 4999, "jeans4.png", &[("32", "Indigo")]),
    (
        "sock2",
        "Wool Socks",
        650,
        "sock2.png",
        &[("One", "Grey"), ("One", "Grey"), ("One", "Black")],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut db_path: Option<String> = None;
    let mut session_id: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--session" | "-s" => {
                if i + 1 < args.len() {
                    session_id = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Demo Session Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("  -s, --session <ID>   Session id (overrides config)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = StorefrontConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = PathBuf::from(path);
    }
    if let Some(id) = session_id {
        config.session.id = Some(id);
    }
    config.validate()?;

    println!("🌱 Storefront Demo Session Seeder");
    println!("=================================");
    println!("Database: {}", config.database.path.display());
    println!("Session:  {}", config.session_id());
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let store = SqliteSessionStore::open(&db, config.session_id()).await?;
    let mut engine = CartEngine::hydrate(store);

    if !engine.cart().is_empty() {
        println!("⚠ Session already has {} items in cart", engine.totals().total_quantity);
    }

    for (id, name, price, image, picks) in DEMO_LINES {
        let snapshot = ProductSnapshot::new(*name, Money::from_cents(*price), *image);
        for (size, color) in picks.iter() {
            engine.add_to_cart(id, size, color, snapshot.clone())?;
        }
    }

    let hat = Product::new("hat9", "Bucket Hat", Money::from_cents(1500)).with_image("hat9.png");
    if !engine.is_in_wishlist(&hat.id) {
        engine.manage_wishlist(hat);
    }

    println!();
    println!("Cart lines:");
    for line in engine.order_lines() {
        let total = line.line_total().unwrap_or_default();
        println!(
            "  {:<14} {:>6} / {:<7} × {:>3}  {:>10}",
            line.name,
            line.size,
            line.color,
            line.quantity,
            config.format(total)
        );
    }

    let draft = engine.order_draft(config.delivery_fee())?;
    println!();
    println!("  Items:        {}", engine.cart_count());
    println!("  Subtotal:     {}", config.format(draft.subtotal));
    println!("  Delivery:     {}", config.format(draft.delivery_fee));
    println!("  Total:        {}", config.format(draft.total));
    println!("  Wishlist:     {}", engine.wishlist().len());

    if let Some(warning) = engine.take_persistence_warning() {
        println!("⚠ {}", warning);
    }

    engine.storage().close().await?;
    db.close().await;

    info!(session_id = %config.session_id(), "Seed complete");
    println!();
    println!("✓ Session saved");
    if !config.session_pinned() {
        println!("  Re-run with --session {} to add to this session", config.session_id());
    }

    Ok(())
}
