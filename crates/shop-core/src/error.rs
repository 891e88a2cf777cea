//! # Error Types
//!
//! Domain-specific error types for shop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shop-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shop-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  shop-cli errors (in app)                                              │
//! │  └── ShopError        - What the console user sees                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ShopError → menu message          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here is recoverable: the menu prints it and lets the user
//! try again.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by shop operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Registration with a username that already exists.
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// Login with a username nobody registered.
    #[error("No user named '{0}'")]
    UnknownUser(String),

    /// Username exists but the password does not match.
    #[error("Invalid password")]
    InvalidCredentials,

    /// Operation requires a logged-in user.
    #[error("You must log in first")]
    NotAuthenticated,

    /// Ticket code unknown, already redeemed, or disabled.
    ///
    /// ## When This Occurs
    /// ```text
    /// redeem_ticket("ABC123")
    ///      │
    ///      ├── no ticket with that code        → InvalidTicket
    ///      ├── available == false               → InvalidTicket
    ///      └── already owned by some user       → InvalidTicket
    /// ```
    #[error("Invalid ticket: {0}")]
    InvalidTicket(String),

    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// User balance is below the price of the purchase.
    #[error("Not enough points: need {required}, have {available}")]
    InsufficientPoints { required: i64, available: i64 },

    /// Inventory cannot cover the requested quantity.
    #[error("{product} is out of stock: available {available}, requested {requested}")]
    OutOfStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Points arithmetic left the representable range.
    #[error("Points balance overflow")]
    PointsOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any database access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
