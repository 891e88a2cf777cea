//! # Shop Error Type
//!
//! Unified error type for shop operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Loyalty Shop                       │
//! │                                                                         │
//! │  Menu selection "Buy"                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  ShopService::buy_product                                        │  │
//! │  │  Result<T, ShopError>                                            │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ───┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Business Error? ─── CoreError::InsufficientPoints ─ ShopError ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Console prints "Not enough points: need 15, have 5" and shows the     │
//! │  menu again. Only startup errors end the program.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use shop_core::CoreError;
use shop_db::DbError;
use std::fmt;

/// Error returned from shop operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Message shown at the console
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed validation
    Validation,

    /// Referenced record does not exist
    NotFound,

    /// A business rule refused the action
    BusinessRule,

    /// The action needs a logged-in user
    Unauthenticated,

    /// Database operation failed
    Database,

    /// Internal error
    Internal,
}

impl ShopError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ShopError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ShopError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ShopError::new(ErrorCode::Validation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ShopError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to shop errors.
impl From<DbError> for ShopError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ShopError::not_found(&entity, &id),
            DbError::UniqueViolation { field, .. } => {
                ShopError::new(ErrorCode::Validation, format!("{} already exists", field))
            }
            DbError::AmbiguousLookup { entity } => {
                tracing::error!(entity = %entity, "Ambiguous single-record lookup");
                ShopError::internal(format!("More than one {} matched", entity))
            }
            DbError::NotInitialized | DbError::AlreadyInitialized => {
                tracing::error!(error = %err, "Connection manager misuse");
                ShopError::internal(err.to_string())
            }
            DbError::ConnectionFailed(_) => {
                ShopError::new(ErrorCode::Database, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ShopError::new(ErrorCode::Database, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ShopError::new(ErrorCode::Database, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ShopError::new(ErrorCode::Database, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ShopError::new(ErrorCode::Validation, "Invalid reference")
            }
            DbError::PoolExhausted => ShopError::new(ErrorCode::Database, "Database busy"),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ShopError::new(ErrorCode::Database, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to shop errors.
impl From<CoreError> for ShopError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(_) => ErrorCode::Validation,
            CoreError::UnknownUser(_) | CoreError::ProductNotFound(_) => ErrorCode::NotFound,
            CoreError::NotAuthenticated => ErrorCode::Unauthenticated,
            CoreError::PointsOverflow => ErrorCode::Internal,
            CoreError::UsernameTaken(_)
            | CoreError::InvalidCredentials
            | CoreError::InvalidTicket(_)
            | CoreError::InsufficientPoints { .. }
            | CoreError::OutOfStock { .. } => ErrorCode::BusinessRule,
        };

        // Validation errors read better without the "Validation error:" prefix
        let message = match err {
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };

        ShopError::new(code, message)
    }
}

impl fmt::Display for ShopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ShopError {}

/// Result type for shop operations.
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::ValidationError;

    #[test]
    fn test_core_error_codes() {
        let err: ShopError = CoreError::InsufficientPoints {
            required: 15,
            available: 5,
        }
        .into();
        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(err.message, "Not enough points: need 15, have 5");

        let err: ShopError = CoreError::NotAuthenticated.into();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        let err: ShopError = CoreError::UnknownUser("bob".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_validation_message_unprefixed() {
        let err: ShopError = CoreError::Validation(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        })
        .into();
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.to_string(), "password must be at least 8 characters");
    }

    #[test]
    fn test_db_error_codes() {
        let err: ShopError = DbError::not_found("Product", 3).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 3");

        let err: ShopError = DbError::QueryFailed("syntax".to_string()).into();
        assert_eq!(err.code, ErrorCode::Database);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_serializes_code() {
        let err = ShopError::validation("bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION");
        assert_eq!(json["message"], "bad");
    }
}
