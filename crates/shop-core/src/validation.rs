//! # Validation Module
//!
//! Input validation for the values the console collects.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console (shop-cli menu)                                      │
//! │  └── Reads raw strings                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, numeric parsing, ranges                                  │
//! │  └── Runs before any database access                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (username, product name, ticket code)                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shop_core::validation::{parse_product_id, validate_password};
//!
//! assert_eq!(parse_product_id(" 3 ").unwrap(), 3);
//! assert!(validate_password("short").is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_ORDER_QUANTITY, MAX_USERNAME_LEN, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a username for registration.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_USERNAME_LEN` characters
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    Ok(())
}

/// Validates a password for registration.
///
/// ## Rules
/// - At least `MIN_PASSWORD_LEN` (8) characters, counted as chars, untrimmed
///
/// ## Example
/// ```rust
/// use shop_core::validation::validate_password;
///
/// assert!(validate_password("longenough1").is_ok());
/// assert!(validate_password("1234567").is_err());
/// ```
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a ticket code before lookup.
///
/// ## Returns
/// The trimmed code.
pub fn validate_ticket_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "ticket".to_string(),
        });
    }

    if code.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "ticket".to_string(),
            max: 64,
        });
    }

    Ok(code.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a product id typed at the console.
///
/// ## Rules
/// - Digits only (surrounding whitespace ignored)
/// - Must be positive
pub fn parse_product_id(input: &str) -> ValidationResult<i64> {
    let input = input.trim();

    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "product id".to_string(),
            reason: "must be a number".to_string(),
        });
    }

    let id: i64 = input.parse().map_err(|_| ValidationError::OutOfRange {
        field: "product id".to_string(),
        min: 1,
        max: i64::MAX,
    })?;

    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "product id".to_string(),
        });
    }

    Ok(id)
}

/// Validates an order quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_ORDER_QUANTITY` (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ORDER_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ORDER_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
