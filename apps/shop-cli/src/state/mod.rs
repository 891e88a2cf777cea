//! # State Module
//!
//! Process-wide state for the console app.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────────┐  ┌──────────────────┐  │
//! │  │ ConnectionManager│  │  Arc<dyn SessionStore>│  │   ShopConfig     │  │
//! │  │  (shop-db)       │  │                      │  │                  │  │
//! │  │  SQLite pool     │  │  "user" → User JSON  │  │  database_url    │  │
//! │  │                  │  │                      │  │  atomic          │  │
//! │  └──────────────────┘  └──────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  • ConnectionManager: initialized once, cloned into the service        │
//! │  • Session: MemoryStorage, lost when the program exits                 │
//! │  • Config: read-only after startup                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::{default_database_path, ConfigError, ShopConfig};
pub use session::{
    clear_current_user, current_user, set_current_user, MemoryStorage, SessionStore, USER_KEY,
};
