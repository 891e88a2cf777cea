//! # Points Module
//!
//! Provides the `Points` type for loyalty balances and prices.
//!
//! ## Balance Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A user's balance never goes below zero.                                │
//! │                                                                         │
//! │  Every debit goes through `Points::debit`, which refuses to produce   │
//! │  a negative balance. The `users.points` CHECK constraint backs it up.  │
//! │                                                                         │
//! │    balance 20 ── debit(15) ──► balance 5                                │
//! │    balance  5 ── debit(15) ──► InsufficientPoints { 15, 5 }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shop_core::points::Points;
//!
//! let balance = Points::new(20);
//! let price = Points::new(15);
//!
//! assert!(balance.covers(price));
//! assert_eq!(balance.debit(price).unwrap(), Points::new(5));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Points Type
// =============================================================================

/// An amount of loyalty points.
///
/// Stored as `i64` to match the SQLite INTEGER column; entity structs keep
/// the raw integer and wrap it in `Points` for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Points(i64);

impl Points {
    /// Wraps a raw point amount.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Points(value)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Zero points.
    #[inline]
    pub const fn zero() -> Self {
        Points(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whether this balance can pay `price`.
    #[inline]
    pub const fn covers(&self, price: Points) -> bool {
        self.0 >= price.0
    }

    /// Adds `amount` to the balance.
    ///
    /// ## Errors
    /// `CoreError::PointsOverflow` if the sum does not fit in `i64`.
    pub fn credit(self, amount: Points) -> CoreResult<Points> {
        self.0
            .checked_add(amount.0)
            .map(Points)
            .ok_or(CoreError::PointsOverflow)
    }

    /// Subtracts `price` from the balance.
    ///
    /// ## Errors
    /// `CoreError::InsufficientPoints` when the balance is below `price`.
    pub fn debit(self, price: Points) -> CoreResult<Points> {
        if !self.covers(price) {
            return Err(CoreError::InsufficientPoints {
                required: price.0,
                available: self.0,
            });
        }

        self.0
            .checked_sub(price.0)
            .map(Points)
            .ok_or(CoreError::PointsOverflow)
    }

    /// Price of `quantity` units at `self` each.
    ///
    /// ## Errors
    /// `CoreError::PointsOverflow` if the product does not fit in `i64`.
    pub fn times(self, quantity: i64) -> CoreResult<Points> {
        self.0
            .checked_mul(quantity)
            .map(Points)
            .ok_or(CoreError::PointsOverflow)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pts", self.0)
    }
}

impl Default for Points {
    fn default() -> Self {
        Points::zero()
    }
}

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Points(value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit() {
        let balance = Points::zero().credit(Points::new(20)).unwrap();
        assert_eq!(balance.value(), 20);
    }

    #[test]
    fn test_credit_overflow() {
        let result = Points::new(i64::MAX).credit(Points::new(1));
        assert!(matches!(result, Err(CoreError::PointsOverflow)));
    }

    #[test]
    fn test_debit_exact_balance() {
        let balance = Points::new(15).debit(Points::new(15)).unwrap();
        assert!(balance.is_zero());
    }

    #[test]
    fn test_debit_insufficient() {
        let err = Points::new(5).debit(Points::new(15)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPoints {
                required: 15,
                available: 5
            }
        ));
    }

    #[test]
    fn test_times() {
        assert_eq!(Points::new(15).times(3).unwrap(), Points::new(45));
        assert!(Points::new(i64::MAX).times(2).is_err());
        assert_eq!(Points::new(15).times(1).unwrap(), Points::new(15));
    }

    #[test]
    fn test_display() {
        assert_eq!(Points::new(20).to_string(), "20 pts");
    }
}
