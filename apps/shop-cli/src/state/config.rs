//! # Configuration
//!
//! Loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line flags (`--database`, `--atomic`)
//! 2. Environment variables (`SHOP_*`)
//! 3. Defaults (this file)

use serde::{Deserialize, Serialize};
use shop_db::{CommitPolicy, DbConfig};
use std::env;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopConfig {
    /// Connection target: a `sqlite:` URL or a file path.
    /// Default: `<platform data dir>/shop.db`
    pub database_url: String,

    /// Run each business operation in one transaction.
    /// Default: false (every step commits on its own)
    pub atomic_operations: bool,
}

impl ShopConfig {
    /// Loads configuration from environment variables.
    ///
    /// ## Variables
    /// - `SHOP_DATABASE_URL` - connection target
    /// - `SHOP_ATOMIC_OPERATIONS` - `true` / `false` / `1` / `0`
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = match env::var("SHOP_DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => default_database_path()?.display().to_string(),
        };

        let atomic_operations = match env::var("SHOP_ATOMIC_OPERATIONS") {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("SHOP_ATOMIC_OPERATIONS".to_string()))?,
            Err(_) => false,
        };

        Ok(ShopConfig {
            database_url,
            atomic_operations,
        })
    }

    /// Applies command line overrides.
    pub fn with_overrides(mut self, database: Option<String>, atomic: bool) -> Self {
        if let Some(database) = database {
            self.database_url = database;
        }
        if atomic {
            self.atomic_operations = true;
        }
        self
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_url.clone())
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        CommitPolicy::from_flag(self.atomic_operations)
    }
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.loyalty.shop/shop.db`
/// - **Windows**: `%APPDATA%\loyalty\shop\data\shop.db`
/// - **Linux**: `~/.local/share/shop/shop.db`
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("com", "loyalty", "shop")
        .ok_or(ConfigError::NoDataDirectory)?;

    let data_dir = proj_dirs.data_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(data_dir)
        .map_err(|e| ConfigError::DataDirectory(format!("{}: {}", data_dir.display(), e)))?;

    Ok(data_dir.join("shop.db"))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine app data directory")]
    NoDataDirectory,

    #[error("Could not create data directory {0}")]
    DataDirectory(String),
}
