//! # Cart Aggregate
//!
//! The shopper's cart: items keyed by id, each carrying a frozen product
//! snapshot and a map of variant quantities.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart                                                                   │
//! │  ├── "shirt1" ─► CartItem { name: "Shirt", price: 2000, image }         │
//! │  │                 variants: { "M-Blue": 2, "L-Red": 1 }                │
//! │  └── "mug7"   ─► CartItem { name: "Mug", price: 900, image }            │
//! │                    variants: { "One-White": 3 }                         │
//! │                                                                         │
//! │  order_lines() ─► (shirt1, M, Blue, 2) (shirt1, L, Red, 1)              │
//! │                   (mug7, One, White, 3)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every item present has at least one variant with quantity > 0
//! - An item whose last variant is removed is deleted, never left empty
//! - Every variant key splits back into exactly `(size, color)`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::money::Money;
use crate::types::ProductSnapshot;
use crate::variant::VariantKey;

// =============================================================================
// Cart Item
// =============================================================================

/// One product in the cart, with its quantities per variant.
///
/// ## Design Notes
/// - `name`, `price`, `image` are frozen at the first add of the item
/// - `variants` is private so only [`Cart`] can change quantities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub name: String,
    pub price: Money,
    pub image: String,
    variants: BTreeMap<VariantKey, u32>,
}

impl CartItem {
    fn from_snapshot(snapshot: ProductSnapshot) -> Self {
        CartItem {
            name: snapshot.name,
            price: snapshot.price,
            image: snapshot.image,
            variants: BTreeMap::new(),
        }
    }

    /// Quantity of one variant (0 when absent).
    pub fn quantity(&self, key: &VariantKey) -> u32 {
        self.variants.get(key).copied().unwrap_or(0)
    }

    /// Iterates `(variant, quantity)` pairs.
    pub fn variants(&self) -> impl Iterator<Item = (&VariantKey, u32)> + '_ {
        self.variants.iter().map(|(key, qty)| (key, *qty))
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One `(item, variant)` line flattened for order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub image: String,
    pub price: Money,
    /// The cart item id this line came from.
    pub product_ref: String,
    pub size: String,
    pub color: String,
}

impl OrderLine {
    /// `price × quantity`, or `None` if it overflows.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_multiply_quantity(self.quantity)
    }

    /// Sum of line totals.
    ///
    /// Lines taken from [`Cart::order_lines`] always sum without overflow;
    /// for other input an overflowing line is left out of the sum.
    pub fn sum_totals<'a>(lines: impl IntoIterator<Item = &'a OrderLine>) -> Money {
        lines.into_iter().fold(Money::zero(), |acc, line| {
            line.line_total()
                .and_then(|total| acc.checked_add(total))
                .unwrap_or(acc)
        })
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart aggregate.
///
/// Serialized form is the persisted `cartItems` record:
/// `{ "<itemId>": { "name", "price", "image", "variants": { "<size>-<color>": qty } } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<String, CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of `(item, variant)` lines.
    pub fn line_count(&self) -> usize {
        self.items.values().map(|item| item.variants.len()).sum()
    }

    pub fn get(&self, item_id: &str) -> Option<&CartItem> {
        self.items.get(item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.contains_key(item_id)
    }

    /// Iterates `(item_id, item)` pairs in id order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &CartItem)> + '_ {
        self.items.iter().map(|(id, item)| (id.as_str(), item))
    }

    /// Adds one unit of a variant, creating the item from `snapshot` if new.
    ///
    /// ## Behavior
    /// - New item: created with the snapshot and an empty variant map
    /// - Existing item: snapshot is ignored (price stays frozen)
    /// - Variant quantity is incremented by 1 (starts at 1)
    ///
    /// ## Returns
    /// The variant's new quantity.
    pub fn add_one(&mut self, item_id: &str, key: VariantKey, snapshot: ProductSnapshot) -> u32 {
        let item = self
            .items
            .entry(item_id.to_string())
            .or_insert_with(|| CartItem::from_snapshot(snapshot));

        let qty = item.variants.entry(key).or_insert(0);
        *qty = qty.saturating_add(1);
        *qty
    }

    /// Overwrites the quantity of a variant of an item already in the cart.
    ///
    /// ## Behavior
    /// - `quantity > 0`: `variants[key] = quantity`
    /// - `quantity <= 0`: the variant is removed, and the item with it if
    ///   that was its last variant
    ///
    /// ## Returns
    /// - `None` if the item is not in the cart (nothing changed)
    /// - `Some(changed)` otherwise
    pub fn set_quantity(&mut self, item_id: &str, key: VariantKey, quantity: i64) -> Option<bool> {
        let item = self.items.get_mut(item_id)?;

        if quantity > 0 {
            let qty = u32::try_from(quantity).unwrap_or(u32::MAX);
            let previous = item.variants.insert(key, qty);
            return Some(previous != Some(qty));
        }

        let removed = item.variants.remove(&key).is_some();
        if item.variants.is_empty() {
            self.items.remove(item_id);
        }
        Some(removed)
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities over [`order_lines`](Self::order_lines).
    pub fn count(&self) -> u64 {
        self.order_lines().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price × quantity` over [`order_lines`](Self::order_lines).
    pub fn amount(&self) -> Money {
        let lines: Vec<OrderLine> = self.order_lines().collect();
        OrderLine::sum_totals(&lines)
    }

    /// Flattens the cart into one [`OrderLine`] per variant.
    ///
    /// Lazy and borrowed: each call walks the current state afresh.
    ///
    /// ## Unpriceable Lines
    /// ```text
    /// price < 0                      ──► skipped + warn!
    /// price × qty overflows          ──► skipped + warn!
    /// running amount + line overflows ──► skipped + warn!
    /// ```
    /// A skipped line is absent from `count()`, `amount()` and every
    /// checkout payload alike.
    pub fn order_lines(&self) -> impl Iterator<Item = OrderLine> + '_ {
        self.variant_lines()
            .scan(Money::zero(), |running, line| {
                let next = if line.price.is_negative() {
                    None
                } else {
                    line.line_total().and_then(|total| running.checked_add(total))
                };

                match next {
                    Some(sum) => {
                        *running = sum;
                        Some(Some(line))
                    }
                    None => {
                        warn!(
                            item_id = %line.product_ref,
                            size = %line.size,
                            color = %line.color,
                            "Skipping unpriceable cart line"
                        );
                        Some(None)
                    }
                }
            })
            .flatten()
    }

    fn variant_lines(&self) -> impl Iterator<Item = OrderLine> + '_ {
        self.items.iter().flat_map(|(item_id, item)| {
            item.variants
                .iter()
                .filter(|(_, qty)| **qty > 0)
                .map(move |(key, qty)| OrderLine {
                    name: item.name.clone(),
                    quantity: *qty,
                    image: item.image.clone(),
                    price: item.price,
                    product_ref: item_id.clone(),
                    size: key.size().to_string(),
                    color: key.color().to_string(),
                })
        })
    }

    // =========================================================================
    // Persisted Record
    // =========================================================================

    /// Serializes the cart into its persisted record.
    pub fn to_record(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Rebuilds a cart from a persisted record, dropping what is malformed.
    ///
    /// ## Sanitising
    /// ```text
    /// record ──► not a JSON object?            ──► Err (caller: empty cart)
    ///        ──► item fails to decode           ──► item dropped
    ///        ──► negative price                 ──► item dropped
    ///        ──► variant key doesn't split      ──► variant dropped
    ///        ──► quantity not in 1..=u32::MAX   ──► variant dropped
    ///        ──► item left with no variants     ──► item dropped
    /// ```
    pub fn from_record(payload: &str) -> serde_json::Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(payload)?;
        let mut cart = Cart::new();

        for (item_id, value) in raw {
            let record: ItemRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(e) => {
                    warn!(item_id = %item_id, error = %e, "Dropping undecodable cart item");
                    continue;
                }
            };

            if record.price.is_negative() {
                warn!(item_id = %item_id, "Dropping cart item with negative price");
                continue;
            }

            let variants: BTreeMap<VariantKey, u32> = record
                .variants
                .into_iter()
                .filter_map(|(key, qty)| {
                    let parsed = key.parse::<VariantKey>().ok()?;
                    let qty = qty.as_u64().and_then(|q| u32::try_from(q).ok())?;
                    (qty > 0).then_some((parsed, qty))
                })
                .collect();

            if variants.is_empty() {
                warn!(item_id = %item_id, "Dropping cart item without valid variants");
                continue;
            }

            cart.items.insert(
                item_id,
                CartItem {
                    name: record.name,
                    price: record.price,
                    image: record.image,
                    variants,
                },
            );
        }

        Ok(cart)
    }
}

/// Lenient decoding target for one persisted item.
#[derive(Debug, Deserialize)]
struct ItemRecord {
    name: String,
    price: Money,
    #[serde(default)]
    image: String,
    #[serde(default)]
    variants: BTreeMap<String, serde_json::Value>,
}

// =============================================================================
// Unit Tests
// =============================================================================
