//! # shop-core: Pure Business Logic for the Loyalty Shop
//!
//! This crate holds the domain model of the shop: the four persisted
//! entities, points arithmetic, input validation and the business-rule
//! errors. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Loyalty Shop Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Console Menu (shop-cli)                         │   │
//! │  │    Log in ──► Redeem ticket ──► Buy ──► Profile                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 Shop Service (shop-cli)                         │   │
//! │  │    register, login, redeem_ticket, buy_product, view_profile    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shop-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │  points   │  │ validation  │  │ creds    │  │   │
//! │  │   │  User     │  │  Points   │  │  username   │  │ Plain-   │  │   │
//! │  │   │  Ticket   │  │  credit   │  │  password   │  │ text     │  │   │
//! │  │   │  Product  │  │  debit    │  │  quantity   │  │ check    │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CONSOLE • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shop-db (Database Layer)                        │   │
//! │  │        SQLite, units of work, generic active records            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (User, Ticket, Product, Order) and insert payloads
//! - [`points`] - Loyalty points with checked arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`credentials`] - Credential comparison placeholder
//!
//! ## Example Usage
//!
//! ```rust
//! use shop_core::points::Points;
//! use shop_core::TICKET_REWARD_POINTS;
//!
//! let balance = Points::zero().credit(TICKET_REWARD_POINTS).unwrap();
//! let balance = balance.debit(Points::new(15)).unwrap();
//! assert_eq!(balance.value(), 5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod credentials;
pub mod error;
pub mod points;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use credentials::{CredentialCheck, PlaintextCredentials};
pub use error::{CoreError, CoreResult, ValidationError};
pub use points::Points;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Points credited to a user for redeeming one ticket.
pub const TICKET_REWARD_POINTS: Points = Points::new(20);

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum username length accepted at registration.
pub const MAX_USERNAME_LEN: usize = 64;

/// Maximum quantity of a single product in one order.
///
/// ## Business Reason
/// The menu always buys one unit; the limit guards programmatic callers
/// against typing 1000 instead of 10.
pub const MAX_ORDER_QUANTITY: i64 = 999;
