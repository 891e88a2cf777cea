//! # Loyalty Shop Console
//!
//! Console front end for the loyalty shop: customers redeem tickets for
//! points and spend points on products.
//!
//! ## Module Organization
//! ```text
//! shop_cli/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Ephemeral session store
//! │   └── config.rs   ◄─── ShopConfig (env + flags)
//! ├── service/
//! │   ├── mod.rs      ◄─── ShopService
//! │   ├── account.rs  ◄─── register / login / logout
//! │   ├── ticket.rs   ◄─── ticket redemption
//! │   └── product.rs  ◄─── products, purchases, profile
//! ├── menu.rs         ◄─── Menu entries and visibility tiers
//! ├── console.rs      ◄─── Line-oriented menu loop and tables
//! └── error.rs        ◄─── ShopError
//! ```

pub mod console;
pub mod error;
pub mod menu;
pub mod service;
pub mod state;

use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use menu::Menu;
use service::ShopService;
use state::{MemoryStorage, ShopConfig};
use shop_db::ConnectionManager;

/// Command line flags. Each one overrides its environment variable.
#[derive(Debug, Parser)]
#[command(name = "shop", version, about = "Loyalty points shop")]
pub struct Cli {
    /// Database file path or sqlite: URL (overrides SHOP_DATABASE_URL)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Commit each business operation as one transaction
    /// (overrides SHOP_ATOMIC_OPERATIONS)
    #[arg(long)]
    pub atomic: bool,
}

/// Runs the console application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • SHOP_* environment variables, then command line flags            │
/// │     • Default database: <platform data dir>/shop.db                     │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • ConnectionManager::initialize (fatal on failure)                  │
/// │     • ensure_schema (embedded migrations)                               │
/// │                                                                         │
/// │  4. Build Service ────────────────────────────────────────────────────► │
/// │     • MemoryStorage session, commit policy from config                  │
/// │                                                                         │
/// │  5. Menu Loop on stdin/stdout until end of input                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ShopConfig::from_env()?.with_overrides(cli.database, cli.atomic);
    info!(database = %config.database_url, policy = ?config.commit_policy(), "Starting loyalty shop");

    let db = ConnectionManager::new();
    db.initialize(config.db_config()).await?;
    db.ensure_schema().await?;
    info!("Database connected and schema ready");

    let service = ShopService::new(db.clone(), Arc::new(MemoryStorage::new()), config.commit_policy());
    let menu = Menu::standard();

    let stdin = io::stdin();
    console::run_console(&service, &menu, stdin.lock(), io::stdout()).await?;

    db.close().await;
    info!("Shop closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages (every SQL statement)
/// - `RUST_LOG=shop=trace` - Trace for the shop crates only
/// - Default: `info,shop=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shop=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
