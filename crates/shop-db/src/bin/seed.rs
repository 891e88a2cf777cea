//! # Seed Data Generator
//!
//! Stocks the product catalogue and issues redemption tickets.
//!
//! ## Usage
//! ```bash
//! # Catalogue (first run only) + 10 fresh tickets
//! cargo run -p shop-db --bin seed
//!
//! # 50 tickets into a specific database
//! cargo run -p shop-db --bin seed -- --db ./data/shop.db --tickets 50
//!
//! # Issue hand-picked codes
//! cargo run -p shop-db --bin seed -- --ticket WELCOME --ticket SPRING24
//! ```
//!
//! Generated codes are printed one per line so they can be handed out.
//! The catalogue is only inserted into an empty `products` table.

use clap::Parser;
use shop_core::{NewProduct, NewTicket};
use shop_db::{ConnectionManager, DbConfig, DbError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Starter catalogue: (name, cost in points, units in stock)
const CATALOGUE: &[(&str, i64, i64)] = &[
    ("Sticker Pack", 5, 200),
    ("Coffee Voucher", 10, 100),
    ("Enamel Mug", 15, 50),
    ("Tote Bag", 25, 40),
    ("Baseball Cap", 30, 30),
    ("Water Bottle", 35, 30),
    ("Hoodie", 80, 15),
    ("Bluetooth Speaker", 150, 5),
];

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed the loyalty shop database")]
struct Args {
    /// Database file path or sqlite: URL
    #[arg(short, long, env = "SHOP_DATABASE_URL", default_value = "./shop_dev.db")]
    db: String,

    /// Number of random tickets to issue
    #[arg(short, long, default_value_t = 10)]
    tickets: usize,

    /// Issue a ticket with this exact code (repeatable)
    #[arg(long = "ticket", value_name = "CODE")]
    codes: Vec<String>,

    /// Do not insert the starter catalogue
    #[arg(long)]
    no_products: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!(db = %args.db, "Seeding database");

    let db = ConnectionManager::connect(DbConfig::new(&args.db)).await?;
    db.ensure_schema().await?;

    if !args.no_products {
        seed_products(&db).await?;
    }

    let mut codes = args.codes.clone();
    codes.extend((0..args.tickets).map(|_| generate_code()));

    let mut issued = 0;
    for code in codes {
        match db.tickets().create(NewTicket { code: code.clone() }).await {
            Ok(ticket) => {
                println!("{}", ticket.code);
                issued += 1;
            }
            Err(DbError::UniqueViolation { .. }) => {
                warn!(code = %code, "Ticket code already exists, skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(issued, "Tickets issued");
    db.close().await;
    Ok(())
}

async fn seed_products(db: &ConnectionManager) -> Result<(), DbError> {
    let existing = db.products().count().await?;
    if existing > 0 {
        info!(existing, "Catalogue already stocked, skipping products");
        return Ok(());
    }

    for (name, cost, count) in CATALOGUE {
        let product = db
            .products()
            .create(NewProduct {
                name: name.to_string(),
                cost: *cost,
                count: *count,
            })
            .await?;
        info!(id = product.id, name = %product.name, cost = product.cost, "Product added");
    }

    Ok(())
}

/// Twelve uppercase hex characters from a v4 UUID.
fn generate_code() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_uppercase()
}
