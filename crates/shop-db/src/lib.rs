//! # shop-db: Persistence Layer for the Loyalty Shop
//!
//! SQLite storage for users, tickets, products and orders, accessed through
//! one generic repository.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Loyalty Shop Data Flow                           │
//! │                                                                         │
//! │  Console menu ──► ShopService (redeem, buy, profile, ...)              │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shop-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────┐  ┌───────────────┐  ┌──────────────┐    │   │
//! │  │   │ConnectionManager │  │ Repository<E> │  │  Migrations  │    │   │
//! │  │   │   (pool.rs)      │  │ users()       │  │  (embedded)  │    │   │
//! │  │   │                  │◄─│ tickets()     │  │ 001_init.sql │    │   │
//! │  │   │ UnitOfWork       │  │ products()    │  │              │    │   │
//! │  │   │ TransactionScope │  │ orders()      │  │              │    │   │
//! │  │   └──────────────────┘  └───────────────┘  └──────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite: <data dir>/shop.db  (or sqlite::memory: in tests)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - `ConnectionManager` and `DbConfig`
//! - [`unit_of_work`] - transactions and commit policies
//! - [`record`] - `Entity`, `Column`, `Fields`, `Value`
//! - [`repository`] - the generic repository and per-entity helpers
//! - [`migrations`] - embedded schema
//! - [`error`] - database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_db::{ConnectionManager, DbConfig, Fields, UserColumn};
//!
//! let db = ConnectionManager::new();
//! db.initialize(DbConfig::new("shop.db")).await?;
//! db.ensure_schema().await?;
//!
//! let alice = db.users().by_username("alice").await?;
//! let rich = db.users().filter(Fields::new().with(UserColumn::Points, 100)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod record;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{ConnectionManager, DbConfig};
pub use record::{Column, Entity, Fields, Value};
pub use repository::{OrderColumn, ProductColumn, Repository, TicketColumn, UserColumn};
pub use unit_of_work::{CommitPolicy, TransactionScope, UnitOfWork};
