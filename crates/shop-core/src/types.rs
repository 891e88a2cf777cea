//! # Domain Types
//!
//! The four persisted entities of the shop and their insert payloads.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐  1     0..1 ┌─────────────────┐                    │
//! │  │      User       │◄────────────│     Ticket      │                    │
//! │  │  ─────────────  │   user_id   │  ─────────────  │                    │
//! │  │  id             │             │  id             │                    │
//! │  │  username (uq)  │             │  code (uq)      │                    │
//! │  │  password       │             │  available      │                    │
//! │  │  points         │             │  user_id?       │                    │
//! │  └────────┬────────┘             └─────────────────┘                    │
//! │           │ 1                                                           │
//! │           │                                                             │
//! │           │ N                                                           │
//! │  ┌────────▼────────┐  N        1 ┌─────────────────┐                    │
//! │  │     Order       │────────────►│    Product      │                    │
//! │  │  ─────────────  │ product_id  │  ─────────────  │                    │
//! │  │  id             │             │  id             │                    │
//! │  │  user_id        │             │  name (uq)      │                    │
//! │  │  product_id     │             │  cost           │                    │
//! │  │  quantity       │             │  count          │                    │
//! │  │  ordered_at     │             └─────────────────┘                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identities are integers assigned by the database. The `New*` structs are
//! what callers hand to `create`; the full structs are what comes back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::points::Points;

// =============================================================================
// User
// =============================================================================

/// A registered shop customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Stored credential. Never serialized, so copies cached outside the
    /// database do not carry it.
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Loyalty balance, never negative.
    pub points: i64,
}

impl User {
    /// Returns the balance as `Points`.
    #[inline]
    pub fn balance(&self) -> Points {
        Points::new(self.points)
    }
}

/// Fields for registering a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub points: i64,
}

// =============================================================================
// Ticket
// =============================================================================

/// A pre-issued redemption code worth a fixed reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ticket {
    pub id: i64,

    /// Redemption code typed by the user.
    pub code: String,

    /// Cleared on redemption.
    pub available: bool,

    /// Set to the redeeming user; `None` until redeemed.
    pub user_id: Option<i64>,
}

impl Ticket {
    /// A ticket can be redeemed only while it is available and unowned.
    ///
    /// ## State Transition
    /// ```text
    /// { available: true,  user_id: None }    ── redeem ──►
    /// { available: false, user_id: Some(u) }  (one way, no un-redeem)
    /// ```
    #[inline]
    pub fn is_redeemable(&self) -> bool {
        self.available && self.user_id.is_none()
    }
}

/// Fields for issuing a ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub code: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be bought with points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Unique display name.
    pub name: String,

    /// Price in points.
    pub cost: i64,

    /// Units in stock.
    pub count: i64,
}

impl Product {
    /// Returns the price as `Points`.
    #[inline]
    pub fn price(&self) -> Points {
        Points::new(self.cost)
    }

    /// Checks if the stock covers `quantity`.
    #[inline]
    pub fn in_stock(&self, quantity: i64) -> bool {
        self.count >= quantity
    }
}

/// Fields for seeding a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub cost: i64,
    pub count: i64,
}

// =============================================================================
// Order
// =============================================================================

/// A completed purchase. Append-only: never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub ordered_at: DateTime<Utc>,
}

/// Fields for recording a purchase.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub ordered_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
