//! # Domain Types
//!
//! Catalog and checkout types that cross the engine boundary.
//!
//! ## Type Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Product Catalog Service                                                │
//! │       │ Product (full snapshot)                                         │
//! │       ├──────────────► WishList (stored as-is)                          │
//! │       │                                                                 │
//! │       │ Product::snapshot()                                             │
//! │       ▼                                                                 │
//! │  ProductSnapshot { name, price, image } ──► CartItem (frozen)           │
//! │                                                                         │
//! │  Cart ──► OrderLine* ──► OrderDraft ──► Order Submission Service        │
//! │       └─► CartTotals ──► cart badge / summary                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::OrderLine;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product as shown on the product page.
///
/// The wishlist stores these whole; identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Opaque product identifier from the catalog.
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Price in minor units.
    pub price: Money,

    /// Image URLs; the first one is used as the cart thumbnail.
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub sub_category: Option<String>,

    /// Sizes offered by the product page picker.
    #[serde(default)]
    pub sizes: Vec<String>,

    /// Colors offered by the product page picker.
    #[serde(default)]
    pub colors: Vec<String>,

    #[serde(default)]
    pub bestseller: bool,
}

impl Product {
    /// Creates a product with only the fields the cart needs.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            images: Vec::new(),
            category: None,
            sub_category: None,
            sizes: Vec::new(),
            colors: Vec::new(),
            bestseller: false,
        }
    }

    /// Adds an image URL (builder style).
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    /// Captures the fields frozen into the cart at add time.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            price: self.price,
            image: self.images.first().cloned().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Product Snapshot
// =============================================================================

/// Product fields copied into the cart when an item is first added.
///
/// ## Price Freezing
/// Later catalog changes do not reach the cart: the snapshot taken on the
/// first add is kept for every variant of that item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductSnapshot {
    pub name: String,
    pub price: Money,
    pub image: String,
}

impl ProductSnapshot {
    pub fn new(name: impl Into<String>, price: Money, image: impl Into<String>) -> Self {
        ProductSnapshot {
            name: name.into(),
            price,
            image: image.into(),
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart summary for the cart badge and the totals panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Number of distinct items.
    pub item_count: usize,

    /// Number of `(item, variant)` lines.
    pub line_count: usize,

    /// Sum of all quantities (the badge number).
    pub total_quantity: u64,

    /// Sum of `price × quantity`.
    pub amount: Money,
}

// =============================================================================
// Order Draft
// =============================================================================

/// Payload handed to the order submission service.
///
/// ## Checkout Workflow
/// ```text
/// engine.order_draft(fee) ──► + address + payment method ──► place order
///                                                               │
///                                          confirmed ◄──────────┘
///                                              │
///                                              ▼
///                                     engine.clear_cart()
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_uses_first_image() {
        let product = Product::new("shirt1", "Shirt", Money::from_cents(2000))
            .with_image("front.png")
            .with_image("back.png");

        let snapshot = product.snapshot();
        assert_eq!(snapshot.name, "Shirt");
        assert_eq!(snapshot.price, Money::from_cents(2000));
        assert_eq!(snapshot.image, "front.png");
    }

    #[test]
    fn test_snapshot_without_images() {
        let product = Product::new("mug", "Mug", Money::from_cents(900));
        assert_eq!(product.snapshot().image, "");
    }

    #[test]
    fn test_product_json_is_camel_case() {
        let mut product = Product::new("p1", "Hoodie", Money::from_cents(4500));
        product.sub_category = Some("Topwear".to_string());

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["subCategory"], "Topwear");
        assert_eq!(json["price"], 4500);

        let minimal: Product =
            serde_json::from_str(r#"{"id":"p2","name":"Cap","price":1200}"#).unwrap();
        assert!(minimal.images.is_empty());
        assert!(!minimal.bestseller);
    }
}
