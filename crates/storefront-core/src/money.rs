//! # Money Module
//!
//! Provides the `Money` type for handling prices and cart amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cart of 3 × $19.99 summed as floats can drift by a fraction of a    │
//! │  cent, and the drift shows up in the order payload.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    3 × 1999 cents = 5997 cents, exactly                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//!
//! assert_eq!(price.checked_multiply_quantity(2), Some(Money::from_cents(2198)));
//! assert_eq!(price.checked_add(Money::from_cents(500)), Some(Money::from_cents(1599)));
//! assert_eq!(Money::from_cents(i64::MAX).checked_add(price), None);
//! ```
//!
//! `Money` has no arithmetic operators. Sums and line totals use the
//! `checked_*` methods and the caller handles `None`.

use rusty_money::{iso, Money as IsoMoney};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized transparently** as a plain integer in persisted records
///
/// ## Where Money is Used
/// ```text
/// Catalog price ──► ProductSnapshot.price ──► CartItem.price (frozen)
///                                                   │
///                                  × quantity ──────┘
///                                                   ▼
///                        cart_amount() ──► OrderDraft.subtotal ──► total
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    ///
    /// Used by cart totals so one absurd line cannot wrap the whole amount.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Formats an amount for display in the given ISO-4217 currency.
///
/// Symbol, digit grouping and decimal places come from the currency
/// metadata, so `JPY` renders without a fractional part and `EUR` uses its
/// own separators.
///
/// ## Example
/// ```rust
/// use storefront_core::money::{format_amount, Money};
///
/// let shown = format_amount("USD", Money::from_cents(4000)).unwrap();
/// assert_eq!(shown, "$40.00");
/// ```
///
/// ## Errors
/// [`CoreError::UnknownCurrency`] when the code is not an ISO-4217 code.
pub fn format_amount(currency_code: &str, amount: Money) -> CoreResult<String> {
    let code = currency_code.trim().to_ascii_uppercase();
    let currency =
        iso::find(&code).ok_or_else(|| CoreError::UnknownCurrency(currency_code.to_string()))?;

    Ok(IsoMoney::from_minor(amount.cents(), currency).to_string())
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a dollar format.
///
/// ## Note
/// This is for logs and debugging. Use [`format_amount`] for what the
/// shopper sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
