//! # Cart State Engine
//!
//! Owns the cart and wishlist of one shopper session, is the only thing that
//! mutates them, and writes them back to storage after every change.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Engine Operations                               │
//! │                                                                         │
//! │  Shopper Action           Engine Call              State Change         │
//! │  ──────────────           ───────────              ────────────         │
//! │                                                                         │
//! │  Add to cart ────────────► add_to_cart() ────────► variant qty += 1     │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ────► variant qty = n      │
//! │                                                    (n <= 0 removes)     │
//! │                                                                         │
//! │  Click remove ───────────► remove_from_cart() ───► variant removed      │
//! │                                                                         │
//! │  Order confirmed ────────► clear_cart() ─────────► cart emptied         │
//! │                                                                         │
//! │  Heart icon ─────────────► manage_wishlist() ────► toggled              │
//! │                                                                         │
//! │  Badge / totals ─────────► cart_count(), cart_amount() (read only)      │
//! │  Checkout ───────────────► order_lines(), order_draft() (read only)     │
//! │                                                                         │
//! │  Every state change is followed by a best-effort write of the whole    │
//! │  record. A failed write is logged and kept as a PersistenceWarning;    │
//! │  the in-memory change stands.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use crate::cart::{Cart, OrderLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::storage::{CartStorage, PersistenceWarning, RecordKey, StorageError};
use crate::types::{CartTotals, OrderDraft, Product, ProductSnapshot};
use crate::validation::{validate_item_id, validate_price};
use crate::variant::VariantKey;
use crate::wishlist::{WishList, WishlistToggle};

/// The cart state engine.
///
/// ## Invariants (after every operation)
/// - Every item in the cart has at least one variant with quantity > 0
/// - Every variant key splits into exactly `(size, color)`
/// - No product id appears twice in the wishlist
#[derive(Debug)]
pub struct CartEngine<S: CartStorage> {
    cart: Cart,
    wishlist: WishList,
    storage: S,
    last_warning: Option<PersistenceWarning>,
}

impl<S: CartStorage> CartEngine<S> {
    /// Creates an engine by reading both records from `storage`.
    ///
    /// ## Degrading On Bad Data
    /// A record that is missing, unreadable, or not parseable at all starts
    /// out empty. A parseable record is sanitised entry by entry, see
    /// [`Cart::from_record`] and [`WishList::from_record`].
    pub fn hydrate(storage: S) -> Self {
        let cart = load_record(&storage, RecordKey::Cart, Cart::from_record).unwrap_or_default();
        let wishlist =
            load_record(&storage, RecordKey::WishList, WishList::from_record).unwrap_or_default();

        info!(
            items = cart.item_count(),
            wishlist = wishlist.len(),
            "Cart engine hydrated"
        );

        CartEngine {
            cart,
            wishlist,
            storage,
            last_warning: None,
        }
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Adds one unit of the `size`/`color` variant of `item_id`.
    ///
    /// ## Behavior
    /// - Size and color must both be selected, else
    ///   `ValidationError::NotSelected` and nothing changes
    /// - A new item takes its name/price/image from `snapshot`; for an item
    ///   already in the cart the snapshot is ignored
    /// - The variant quantity goes up by 1 (starting at 1)
    ///
    /// ## User Workflow
    /// ```text
    /// Product page ── pick size "M", color "Blue" ── "Add to cart"
    ///      │
    ///      ▼
    /// add_to_cart("shirt1", "M", "Blue", snapshot) ← THIS FUNCTION
    ///      │
    ///      ├── size/color missing? → Err: "Select size/color"
    ///      │
    ///      └── OK → cart["shirt1"].variants["M-Blue"] += 1 → persist
    /// ```
    pub fn add_to_cart(
        &mut self,
        item_id: &str,
        size: &str,
        color: &str,
        snapshot: ProductSnapshot,
    ) -> CoreResult<()> {
        validate_item_id(item_id)?;
        let key = VariantKey::new(size, color)?;
        validate_price(snapshot.price)?;

        let qty = self.cart.add_one(item_id, key.clone(), snapshot);
        debug!(item_id = %item_id, variant = %key, quantity = qty, "Added to cart");

        self.persist_cart();
        Ok(())
    }

    /// Sets the quantity of a variant of an item already in the cart.
    ///
    /// ## Behavior
    /// - `quantity > 0`: overwrites the variant quantity (creating the
    ///   variant if the item had other variants only)
    /// - `quantity <= 0`: removes the variant, and the item if it was the
    ///   last one
    ///
    /// ## Errors
    /// - [`CoreError::ItemNotInCart`] if `item_id` is not in the cart
    /// - `ValidationError` if size or color is missing/invalid
    pub fn update_quantity(
        &mut self,
        item_id: &str,
        size: &str,
        color: &str,
        quantity: i64,
    ) -> CoreResult<()> {
        let key = VariantKey::new(size, color)?;

        let changed = self
            .cart
            .set_quantity(item_id, key.clone(), quantity)
            .ok_or_else(|| CoreError::ItemNotInCart {
                item_id: item_id.to_string(),
            })?;

        debug!(
            item_id = %item_id,
            variant = %key,
            quantity,
            changed,
            "Updated cart quantity"
        );

        if changed {
            self.persist_cart();
        }
        Ok(())
    }

    /// Removes a variant; same as `update_quantity(.., 0)`.
    pub fn remove_from_cart(&mut self, item_id: &str, size: &str, color: &str) -> CoreResult<()> {
        self.update_quantity(item_id, size, color, 0)
    }

    /// Empties the cart.
    ///
    /// ## When To Call
    /// After the order submission service confirmed the order. Submitting an
    /// order does not clear the cart by itself.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        info!("Cart cleared");
        self.persist_cart();
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Toggles `product` in the wishlist (compared by product id).
    pub fn manage_wishlist(&mut self, product: Product) -> WishlistToggle {
        let product_id = product.id.clone();
        let outcome = self.wishlist.toggle(product);
        debug!(product_id = %product_id, ?outcome, "Toggled wishlist");

        self.persist_wishlist();
        outcome
    }

    pub fn is_in_wishlist(&self, product_id: &str) -> bool {
        self.wishlist.contains(product_id)
    }

    // =========================================================================
    // Derivations
    // =========================================================================

    /// Sum of all variant quantities (0 for an empty cart).
    pub fn cart_count(&self) -> u64 {
        self.cart.count()
    }

    /// Sum of `price × quantity` over [`order_lines`](Self::order_lines).
    pub fn cart_amount(&self) -> Money {
        self.cart.amount()
    }

    /// One [`OrderLine`] per `(item, variant)`, computed from current state.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let items: Vec<OrderLine> = engine.order_lines().collect();
    /// orders.place(items, address, payment).await?;
    /// ```
    pub fn order_lines(&self) -> impl Iterator<Item = OrderLine> + '_ {
        self.cart.order_lines()
    }

    /// Badge and summary numbers in one pass over the cart.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.cart.item_count(),
            line_count: self.cart.line_count(),
            total_quantity: self.cart.count(),
            amount: self.cart.amount(),
        }
    }

    /// Builds the payload for the order submission service.
    ///
    /// The delivery fee is only charged when the cart has something in it.
    /// `subtotal` is summed from `items` themselves, so the two always agree.
    ///
    /// ## Errors
    /// - [`CoreError::AmountOverflow`] if `subtotal + delivery_fee` overflows
    pub fn order_draft(&self, delivery_fee: Money) -> CoreResult<OrderDraft> {
        let items: Vec<OrderLine> = self.order_lines().collect();
        let subtotal = OrderLine::sum_totals(&items);
        let delivery_fee = if items.is_empty() {
            Money::zero()
        } else {
            delivery_fee
        };

        let total = subtotal
            .checked_add(delivery_fee)
            .ok_or(CoreError::AmountOverflow)?;

        Ok(OrderDraft {
            items,
            subtotal,
            delivery_fee,
            total,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn wishlist(&self) -> &WishList {
        &self.wishlist
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The most recent failed write-back, if any.
    pub fn last_persistence_warning(&self) -> Option<&PersistenceWarning> {
        self.last_warning.as_ref()
    }

    /// Takes the most recent failed write-back, clearing it.
    pub fn take_persistence_warning(&mut self) -> Option<PersistenceWarning> {
        self.last_warning.take()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn persist_cart(&mut self) {
        let payload = self.cart.to_record().map_err(StorageError::from);
        self.write_back(RecordKey::Cart, payload);
    }

    fn persist_wishlist(&mut self) {
        let payload = self.wishlist.to_record().map_err(StorageError::from);
        self.write_back(RecordKey::WishList, payload);
    }

    fn write_back(&mut self, key: RecordKey, payload: Result<String, StorageError>) {
        let result = payload.and_then(|payload| self.storage.write(key, payload));

        if let Err(source) = result {
            let warning = PersistenceWarning { key, source };
            warn!(%warning, "Write-back failed; in-memory state kept");
            self.last_warning = Some(warning);
        }
    }
}

/// Reads and decodes one record, logging why it was discarded if it was.
fn load_record<S, T>(
    storage: &S,
    key: RecordKey,
    decode: fn(&str) -> serde_json::Result<T>,
) -> Option<T>
where
    S: CartStorage,
{
    match storage.read(key) {
        Ok(Some(payload)) => match decode(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%key, error = %e, "Corrupt record; starting empty");
                None
            }
        },
        Ok(None) => {
            debug!(%key, "No stored record; starting empty");
            None
        }
        Err(e) => {
            warn!(%key, error = %e, "Could not read record; starting empty");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn engine() -> CartEngine<Arc<MemoryStorage>> {
        CartEngine::hydrate(Arc::new(MemoryStorage::new()))
    }

    fn shirt() -> ProductSnapshot {
        ProductSnapshot::new("Shirt", Money::from_cents(2000), "img.png")
    }

    fn product(id: &str) -> Product {
        Product::new(id, format!("Product {}", id), Money::from_cents(1000))
    }

    /// Storage whose writes fail while `failing` is set.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        failing: AtomicBool,
    }

    impl CartStorage for FlakyStorage {
        fn read(&self, key: RecordKey) -> Result<Option<String>, StorageError> {
            self.inner.read(key)
        }

        fn write(&self, key: RecordKey, payload: String) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Backend("quota exceeded".to_string()));
            }
            self.inner.write(key, payload)
        }
    }

    fn assert_invariants<S: CartStorage>(engine: &CartEngine<S>) {
        for (_, item) in engine.cart().items() {
            assert!(item.variants().any(|(_, qty)| qty > 0));
        }

        let lines: Vec<OrderLine> = engine.order_lines().collect();
        let qty: u64 = lines.iter().map(|l| u64::from(l.quantity)).sum();
        assert!(lines.iter().all(|l| l.line_total().is_some()));
        let amount = lines.iter().fold(Money::zero(), |acc, l| {
            l.line_total().and_then(|t| acc.checked_add(t)).unwrap()
        });
        assert_eq!(engine.cart_count(), qty);
        assert_eq!(engine.cart_amount(), amount);
    }

    #[test]
    fn test_same_variant_twice() {
        let mut engine = engine();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();

        let item = engine.cart().get("shirt1").unwrap();
        let key = VariantKey::new("M", "Blue").unwrap();
        assert_eq!(engine.cart().item_count(), 1);
        assert_eq!(item.quantity(&key), 2);
        assert_eq!(engine.cart_amount(), Money::from_cents(4000));
        assert_invariants(&engine);
    }

    #[test]
    fn test_update_to_zero_removes_item() {
        let mut engine = engine();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        engine.update_quantity("shirt1", "M", "Blue", 0).unwrap();

        assert!(engine.cart().is_empty());
        assert_eq!(engine.cart_count(), 0);
        assert_invariants(&engine);
    }

    #[test]
    fn test_add_without_size_fails() {
        let mut engine = engine();
        let err = engine.add_to_cart("shirt1", "", "Blue", shirt()).unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotSelected { ref field }) if field == "size"
        ));
        assert!(engine.cart().is_empty());
        assert_eq!(engine.storage().read(RecordKey::Cart).unwrap(), None);
    }

    #[test]
    fn test_add_without_color_fails() {
        let mut engine = engine();
        assert!(engine.add_to_cart("shirt1", "M", "  ", shirt()).is_err());
        assert!(engine.cart().is_empty());
    }

    #[test]
    fn test_add_with_separator_in_size_fails() {
        let mut engine = engine();
        let err = engine.add_to_cart("shirt1", "X-L", "Blue", shirt()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));
        assert!(engine.cart().is_empty());
    }

    #[test]
    fn test_count_over_three_variants() {
        let mut engine = engine();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        engine.add_to_cart("shirt1", "L", "Red", shirt()).unwrap();
        engine
            .add_to_cart("mug7", "One", "White", ProductSnapshot::new("Mug", Money::from_cents(900), ""))
            .unwrap();

        engine.update_quantity("shirt1", "M", "Blue", 2).unwrap();
        engine.update_quantity("mug7", "One", "White", 3).unwrap();

        assert_eq!(engine.cart_count(), 6);
        assert_eq!(engine.cart_amount(), Money::from_cents(2 * 2000 + 2000 + 3 * 900));
        assert_invariants(&engine);
    }

    #[test]
    fn test_update_unknown_item_is_error() {
        let mut engine = engine();
        let err = engine.update_quantity("ghost", "M", "Blue", 2).unwrap_err();

        assert!(matches!(err, CoreError::ItemNotInCart { ref item_id } if item_id == "ghost"));
        assert!(engine.cart().is_empty());
    }

    #[test]
    fn test_update_unknown_variant_of_known_item() {
        let mut engine = engine();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();

        engine.remove_from_cart("shirt1", "L", "Red").unwrap();
        assert_eq!(engine.cart_count(), 1);

        engine.update_quantity("shirt1", "L", "Red", 4).unwrap();
        assert_eq!(engine.cart_count(), 5);
        assert_invariants(&engine);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let mut engine = engine();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();

        let stored = engine.storage().read(RecordKey::Cart).unwrap().unwrap();
        assert_eq!(Cart::from_record(&stored).unwrap(), *engine.cart());

        engine.manage_wishlist(product("a"));
        let stored = engine.storage().read(RecordKey::WishList).unwrap().unwrap();
        assert_eq!(WishList::from_record(&stored).unwrap(), *engine.wishlist());
    }

    #[test]
    fn test_persist_then_rehydrate() {
        let storage = Arc::new(MemoryStorage::new());
        let mut engine = CartEngine::hydrate(Arc::clone(&storage));
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        engine.add_to_cart("shirt1", "L", "Red", shirt()).unwrap();
        engine.manage_wishlist(product("a"));
        engine.manage_wishlist(product("b"));

        let rehydrated = CartEngine::hydrate(Arc::clone(&storage));
        assert_eq!(rehydrated.cart(), engine.cart());
        assert_eq!(rehydrated.wishlist(), engine.wishlist());
    }

    #[test]
    fn test_corrupt_records_hydrate_empty() {
        let storage = MemoryStorage::new()
            .with_record(RecordKey::Cart, "{not json")
            .with_record(RecordKey::WishList, "\"nope\"");

        let engine = CartEngine::hydrate(storage);
        assert!(engine.cart().is_empty());
        assert!(engine.wishlist().is_empty());
    }

    #[test]
    fn test_wishlist_toggle_twice() {
        let mut engine = engine();

        assert_eq!(engine.manage_wishlist(product("a")), WishlistToggle::Added);
        assert!(engine.is_in_wishlist("a"));

        assert_eq!(engine.manage_wishlist(product("a")), WishlistToggle::Removed);
        assert!(engine.wishlist().is_empty());
    }

    #[test]
    fn test_failed_write_keeps_state() {
        let storage = Arc::new(FlakyStorage::default());
        let mut engine = CartEngine::hydrate(Arc::clone(&storage));

        storage.failing.store(true, Ordering::SeqCst);
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();

        assert_eq!(engine.cart_count(), 1);
        let warning = engine.take_persistence_warning().unwrap();
        assert_eq!(warning.key, RecordKey::Cart);
        assert!(engine.last_persistence_warning().is_none());

        storage.failing.store(false, Ordering::SeqCst);
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        assert!(engine.last_persistence_warning().is_none());
        assert!(storage.read(RecordKey::Cart).unwrap().is_some());
    }

    #[test]
    fn test_clear_cart() {
        let mut engine = engine();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        engine.manage_wishlist(product("a"));

        engine.clear_cart();
        assert!(engine.cart().is_empty());
        assert!(engine.is_in_wishlist("a"));
        assert_eq!(engine.storage().read(RecordKey::Cart).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_order_lines_are_recomputed() {
        let mut engine = engine();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        assert_eq!(engine.order_lines().count(), 1);

        engine.add_to_cart("shirt1", "L", "Red", shirt()).unwrap();
        let lines: Vec<OrderLine> = engine.order_lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.product_ref == "shirt1"));
        assert!(lines.iter().any(|l| l.size == "L" && l.color == "Red"));
    }

    #[test]
    fn test_totals_and_order_draft() {
        let mut engine = engine();
        let fee = Money::from_cents(500);

        let empty = engine.order_draft(fee).unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.total, Money::zero());

        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();

        let totals = engine.totals();
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.line_count, 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.amount, Money::from_cents(4000));

        let draft = engine.order_draft(fee).unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.subtotal, Money::from_cents(4000));
        assert_eq!(draft.delivery_fee, fee);
        assert_eq!(draft.total, Money::from_cents(4500));
    }

    fn gold(price: i64) -> ProductSnapshot {
        ProductSnapshot::new("Gold", Money::from_cents(price), "gold.png")
    }

    #[test]
    fn test_order_draft_total_overflow_is_an_error() {
        let mut engine = engine();
        engine.add_to_cart("gold", "One", "Gold", gold(i64::MAX)).unwrap();

        let err = engine.order_draft(Money::from_cents(500)).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));

        let draft = engine.order_draft(Money::zero()).unwrap();
        assert_eq!(draft.total, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_order_draft_items_agree_with_subtotal() {
        let mut engine = engine();
        engine
            .add_to_cart("gold", "One", "Gold", gold(i64::MAX / 2 + 1))
            .unwrap();
        engine.add_to_cart("gold", "One", "Gold", gold(0)).unwrap();
        engine.add_to_cart("shirt1", "M", "Blue", shirt()).unwrap();

        let draft = engine.order_draft(Money::from_cents(500)).unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].product_ref, "shirt1");
        assert_eq!(draft.subtotal, Money::from_cents(2000));
        assert_eq!(draft.subtotal, engine.cart_amount());
        assert_eq!(draft.total, Money::from_cents(2500));
        assert_eq!(engine.cart_count(), 1);
        assert_invariants(&engine);
    }

    #[test]
    fn test_invariants_over_operation_sequence() {
        let mut engine = engine();
        let sizes = ["S", "M", "L"];
        let colors = ["Red", "Blue"];

        for step in 0..60i64 {
            let item = format!("item{}", step % 4);
            let size = sizes[(step % 3) as usize];
            let color = colors[(step % 2) as usize];

            match step % 5 {
                0 | 1 | 2 => engine.add_to_cart(&item, size, color, shirt()).unwrap(),
                3 => {
                    let _ = engine.update_quantity(&item, size, color, (step % 7) - 2);
                }
                _ => {
                    let _ = engine.remove_from_cart(&item, size, color);
                }
            }
            assert_invariants(&engine);
        }
    }
}
