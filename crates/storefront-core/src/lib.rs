//! # storefront-core: Cart State Engine
//!
//! This crate is the **heart** of the storefront client state. It owns the
//! shopper's cart and wishlist, every rule about how they change, and the
//! projections handed to checkout.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront UI                                │   │
//! │  │   Product Page ──► Cart Page ──► Checkout ──► Order Summary     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartSession (injected)                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ storefront-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  engine   │  │   cart    │  │ wishlist  │  │   money   │  │   │
//! │  │   │CartEngine │  │   Cart    │  │ WishList  │  │   Money   │  │   │
//! │  │   │CartSession│  │ CartItem  │  │  Product  │  │  format   │  │   │
//! │  │   └─────┬─────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │         │ CartStorage (trait)                                   │   │
//! │  └─────────┼───────────────────────────────────────────────────────┘   │
//! │            │                                                            │
//! │  ┌─────────▼───────────────────────────────────────────────────────┐   │
//! │  │   MemoryStorage (here)   │   SqliteSessionStore (storefront-db)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - The cart state engine and its operations
//! - [`session`] - Shared, injectable handle around an engine
//! - [`cart`] - Cart aggregate, items, and order projections
//! - [`wishlist`] - WishList aggregate
//! - [`variant`] - Size/color variant keys
//! - [`types`] - Catalog product types and checkout payloads
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`storage`] - Persistence seam and in-memory backend
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{CartEngine, MemoryStorage, Money, ProductSnapshot};
//!
//! let mut engine = CartEngine::hydrate(MemoryStorage::new());
//! let shirt = ProductSnapshot::new("Shirt", Money::from_cents(2000), "img.png");
//!
//! engine.add_to_cart("shirt1", "M", "Blue", shirt.clone()).unwrap();
//! engine.add_to_cart("shirt1", "M", "Blue", shirt).unwrap();
//!
//! assert_eq!(engine.cart_count(), 2);
//! assert_eq!(engine.cart_amount(), Money::from_cents(4000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod engine;
pub mod error;
pub mod money;
pub mod session;
pub mod storage;
pub mod types;
pub mod validation;
pub mod variant;
pub mod wishlist;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, OrderLine};
pub use engine::CartEngine;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{format_amount, Money};
pub use session::CartSession;
pub use storage::{CartStorage, MemoryStorage, PersistenceWarning, RecordKey, StorageError};
pub use types::{CartTotals, OrderDraft, Product, ProductSnapshot};
pub use variant::VariantKey;
pub use wishlist::{WishList, WishlistToggle};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Separator joining size and color inside a [`VariantKey`].
///
/// Size and color values must never contain it, otherwise the key cannot be
/// split back into exactly two parts.
pub const VARIANT_SEPARATOR: char = '-';
