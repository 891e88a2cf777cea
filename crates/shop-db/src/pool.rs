//! # Connection Manager
//!
//! Owns the one SQLite pool of the process and hands out units of work.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Connection Manager Lifecycle                       │
//! │                                                                         │
//! │  ConnectionManager::new()          ← empty slot, cheap to clone         │
//! │       │                                                                 │
//! │       │   open_unit_of_work() here → DbError::NotInitialized            │
//! │       ▼                                                                 │
//! │  initialize(DbConfig)              ← parse target, build pool           │
//! │       │                                                                 │
//! │       │   initialize() again       → DbError::AlreadyInitialized        │
//! │       ▼                                                                 │
//! │  ensure_schema()                   ← embedded migrations, idempotent    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  open_unit_of_work() ──► UnitOfWork ──► commit() / rollback() / drop    │
//! │  open_unit_of_work() ──► UnitOfWork ──► ...                             │
//! │                                                                         │
//! │  Every clone shares the same slot: initializing through one clone      │
//! │  initializes them all.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases use WAL journaling with NORMAL synchronous. In-memory
//! databases keep SQLite's memory journal and a single connection that is
//! never recycled (closing it would discard the database).

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::Repository;
use crate::unit_of_work::UnitOfWork;
use shop_core::{Order, Product, Ticket, User};

// =============================================================================
// Configuration
// =============================================================================

/// Connection configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./shop.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection target: a `sqlite:` URL or a plain file path.
    pub target: String,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections
    /// forever.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,
}

impl DbConfig {
    /// Creates a configuration for the given connection target.
    ///
    /// ## Arguments
    /// * `target` - `sqlite://shop.db`, `sqlite::memory:`, or a bare path such
    ///   as `./data/shop.db` (created if missing).
    pub fn new(target: impl Into<String>) -> Self {
        DbConfig {
            target: target.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Creates an isolated in-memory database configuration (for testing).
    ///
    /// Each call yields a fresh, empty database once initialized.
    pub fn in_memory() -> Self {
        DbConfig {
            target: "sqlite::memory:".to_string(),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
        }
    }

    /// Whether the target names an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.target.contains(":memory:") || self.target.contains("mode=memory")
    }

    /// The URL handed to sqlx.
    ///
    /// Bare paths become `sqlite://<path>?mode=rwc` so the file is created
    /// on first use.
    pub fn connect_url(&self) -> String {
        let target = self.target.trim();
        if target.starts_with("sqlite:") {
            target.to_string()
        } else {
            format!("sqlite://{}?mode=rwc", target)
        }
    }
}

// =============================================================================
// Connection Manager
// =============================================================================

/// The shared handle to the backing store.
///
/// ## Design: Injected, Initialize Once
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  There is no global. main() builds one ConnectionManager, initializes  │
/// │  it, and passes clones to whoever needs data access:                   │
/// │                                                                         │
/// │    let db = ConnectionManager::new();                                  │
/// │    db.initialize(config).await?;                                       │
/// │    db.ensure_schema().await?;                                          │
/// │    let service = ShopService::new(db.clone(), session, policy);        │
/// │                                                                         │
/// │  Clones are cheap (Arc) and all point at the same pool.                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    pool: Arc<OnceLock<SqlitePool>>,
}

impl ConnectionManager {
    /// Creates an uninitialized connection manager.
    pub fn new() -> Self {
        ConnectionManager::default()
    }

    /// Creates a manager and initializes it in one go.
    pub async fn connect(config: DbConfig) -> DbResult<Self> {
        let manager = ConnectionManager::new();
        manager.initialize(config).await?;
        Ok(manager)
    }

    /// Configures the backing-store connection.
    ///
    /// ## What This Does
    /// 1. Parses the connection target (malformed → `ConnectionFailed`)
    /// 2. Enables foreign keys; WAL + NORMAL synchronous for file databases
    /// 3. Creates the pool and opens the first connection (unreachable →
    ///    `ConnectionFailed`)
    ///
    /// ## Errors
    /// * `DbError::AlreadyInitialized` - called more than once
    /// * `DbError::ConnectionFailed` - bad or unreachable target; fatal
    pub async fn initialize(&self, config: DbConfig) -> DbResult<()> {
        if self.pool.get().is_some() {
            return Err(DbError::AlreadyInitialized);
        }

        let connect_url = config.connect_url();
        let in_memory = config.is_in_memory();

        info!(target = %config.target, in_memory, "Initializing database connection");

        let mut connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // SQLite has foreign keys disabled by default
            .foreign_keys(true)
            .create_if_missing(true);

        if !in_memory {
            connect_options = connect_options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);

        if in_memory {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        self.pool
            .set(pool)
            .map_err(|_| DbError::AlreadyInitialized)?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        Ok(())
    }

    /// Whether `initialize` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.pool.get().is_some()
    }

    /// Returns the pool, failing fast before initialization.
    fn pool(&self) -> DbResult<&SqlitePool> {
        self.pool.get().ok_or(DbError::NotInitialized)
    }

    /// Creates all entity tables if absent.
    ///
    /// Idempotent: safe to call on every startup.
    pub async fn ensure_schema(&self) -> DbResult<()> {
        let pool = self.pool()?;
        migrations::run_migrations(pool).await
    }

    /// Returns `(total, applied)` migration counts for diagnostics.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        let pool = self.pool()?;
        migrations::migration_status(pool).await
    }

    /// Begins a new unit of work on the shared pool.
    ///
    /// Each unit of work is independent; it is consumed by `commit` or
    /// `rollback` and rolls back when dropped uncommitted.
    pub async fn open_unit_of_work(&self) -> DbResult<UnitOfWork> {
        let pool = self.pool()?;
        UnitOfWork::begin(pool).await
    }

    /// Returns the user repository.
    pub fn users(&self) -> Repository<User> {
        Repository::new(self.clone())
    }

    /// Returns the ticket repository.
    pub fn tickets(&self) -> Repository<Ticket> {
        Repository::new(self.clone())
    }

    /// Returns the product repository.
    pub fn products(&self) -> Repository<Product> {
        Repository::new(self.clone())
    }

    /// Returns the order repository.
    pub fn orders(&self) -> Repository<Order> {
        Repository::new(self.clone())
    }

    /// Closes the connection pool.
    ///
    /// ## Note
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            info!("Closing database connection pool");
            pool.close().await;
        }
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        match self.pool() {
            Ok(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            Err(_) => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = ConnectionManager::connect(DbConfig::in_memory())
            .await
            .unwrap();

        assert!(db.is_initialized());
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_use_before_initialize_fails_fast() {
        let db = ConnectionManager::new();

        assert!(!db.health_check().await);
        assert!(matches!(
            db.open_unit_of_work().await,
            Err(DbError::NotInitialized)
        ));
        assert!(matches!(
            db.ensure_schema().await,
            Err(DbError::NotInitialized)
        ));
        assert!(matches!(db.users().all().await, Err(DbError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_second_initialize_rejected() {
        let db = ConnectionManager::connect(DbConfig::in_memory())
            .await
            .unwrap();

        let clone = db.clone();
        let err = clone.initialize(DbConfig::in_memory()).await.unwrap_err();
        assert!(matches!(err, DbError::AlreadyInitialized));
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_malformed_target() {
        let db = ConnectionManager::new();
        let err = db
            .initialize(DbConfig::new("sqlite://shop.db?mode=bogus"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert!(!db.is_initialized());
    }

    #[tokio::test]
    async fn test_unreachable_target() {
        let db = ConnectionManager::new();
        let err = db
            .initialize(
                DbConfig::new("/definitely/not/a/dir/shop.db")
                    .connect_timeout(Duration::from_secs(1)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_ensure_schema_idempotent() {
        let db = ConnectionManager::connect(DbConfig::in_memory())
            .await
            .unwrap();

        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();

        let (total, applied) = db.migration_status().await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        let target = path.display().to_string();

        let first = ConnectionManager::connect(DbConfig::new(target.clone()))
            .await
            .unwrap();
        first.ensure_schema().await.unwrap();
        first
            .products()
            .create(shop_core::NewProduct {
                name: "Mug".to_string(),
                cost: 15,
                count: 5,
            })
            .await
            .unwrap();
        first.close().await;

        let second = ConnectionManager::connect(DbConfig::new(target))
            .await
            .unwrap();
        second.ensure_schema().await.unwrap();
        let products = second.products().all().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Mug");
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
        assert_eq!(config.connect_url(), "sqlite:///tmp/test.db?mode=rwc");
    }

    #[test]
    fn test_in_memory_config() {
        let config = DbConfig::in_memory();
        assert!(config.is_in_memory());
        assert_eq!(config.connect_url(), "sqlite::memory:");
        assert_eq!(config.max_connections, 1);
    }
}
