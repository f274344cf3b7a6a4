//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Operation failures returned to callers         │
//! │  └── ValidationError  - Input insufficient for the mutation            │
//! │                                                                         │
//! │  storefront-core storage (storage.rs)                                  │
//! │  ├── StorageError        - A backend read/write failed                 │
//! │  └── PersistenceWarning  - Non-fatal: logged, never returned           │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - SQLite operation failures                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → UI notice ("Select size/color")   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, field, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by cart engine operations.
///
/// All of them are recoverable: the engine state is unchanged when one is
/// returned.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The item is not in the cart.
    ///
    /// ## When This Occurs
    /// - `update_quantity` / `remove_from_cart` for an item id that was never
    ///   added, or was already removed
    #[error("Item not in cart: {item_id}")]
    ItemNotInCart { item_id: String },

    /// Subtotal plus delivery fee does not fit in `Money`.
    #[error("Order total overflows")]
    AmountOverflow,

    /// Currency code has no ISO-4217 entry.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when shopper input doesn't meet the requirements of a
/// mutation. They are surfaced as transient notices; the shopper corrects
/// the input and retries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A variant dimension (size or color) was not chosen.
    ///
    /// ## User Workflow
    /// ```text
    /// Product page: no size picked
    ///      │
    ///      ▼
    /// Click "Add to cart"
    ///      │
    ///      ▼
    /// NotSelected { field: "size" }
    ///      │
    ///      ▼
    /// UI shows: "Select size/color"
    /// ```
    #[error("Select size/color (missing {field})")]
    NotSelected { field: String },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g. separator inside a size value).
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
