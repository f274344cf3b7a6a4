//! # WishList Aggregate
//!
//! Ordered list of saved products, at most one entry per product id.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::Product;

/// Outcome of a wishlist toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WishlistToggle {
    Added,
    Removed,
}

/// The wishlist aggregate.
///
/// Serialized form is the persisted `wishList` record: a JSON array of
/// products in the order they were saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WishList {
    products: Vec<Product>,
}

impl WishList {
    pub fn new() -> Self {
        WishList::default()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.iter().any(|p| p.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Removes the product if present (by id), appends it otherwise.
    pub fn toggle(&mut self, product: Product) -> WishlistToggle {
        let before = self.products.len();
        self.products.retain(|p| p.id != product.id);

        if self.products.len() == before {
            self.products.push(product);
            WishlistToggle::Added
        } else {
            WishlistToggle::Removed
        }
    }

    pub fn to_record(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Rebuilds a wishlist from its persisted record.
    ///
    /// Entries that fail to decode are dropped, and so are repeats of a
    /// product id already seen (the first occurrence wins).
    pub fn from_record(payload: &str) -> serde_json::Result<Self> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(payload)?;
        let mut seen = HashSet::new();
        let mut products = Vec::with_capacity(raw.len());

        for value in raw {
            match serde_json::from_value::<Product>(value) {
                Ok(product) if seen.insert(product.id.clone()) => products.push(product),
                Ok(product) => {
                    warn!(product_id = %product.id, "Dropping duplicate wishlist entry");
                }
                Err(e) => warn!(error = %e, "Dropping undecodable wishlist entry"),
            }
        }

        Ok(WishList { products })
    }
}
