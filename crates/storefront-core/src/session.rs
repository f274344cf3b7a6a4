//! # Cart Session
//!
//! Shared handle around one [`CartEngine`], passed to every UI surface that
//! reads or changes the cart.
//!
//! ## Thread Safety
//! The engine is wrapped in `Arc<Mutex<T>>` because:
//! 1. Several views (badge, cart page, checkout) hold the same session
//! 2. Only one of them may mutate at a time
//! 3. A mutation and its write-back happen under the same lock
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Product page │   │  Cart badge  │   │   Checkout   │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        │ with_engine_mut  │ with_engine      │ with_engine
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!              Arc<Mutex<CartEngine<S>>>
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::CartEngine;
use crate::storage::CartStorage;

/// Cloneable, injectable handle to a shopper's cart state.
#[derive(Debug)]
pub struct CartSession<S: CartStorage> {
    engine: Arc<Mutex<CartEngine<S>>>,
}

impl<S: CartStorage> CartSession<S> {
    pub fn new(engine: CartEngine<S>) -> Self {
        CartSession {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Hydrates an engine from `storage` and wraps it.
    pub fn hydrate(storage: S) -> Self {
        CartSession::new(CartEngine::hydrate(storage))
    }

    /// Executes a function with read access to the engine.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let badge = session.with_engine(|engine| engine.cart_count());
    /// ```
    pub fn with_engine<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartEngine<S>) -> R,
    {
        let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&engine)
    }

    /// Executes a function with write access to the engine.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session.with_engine_mut(|engine| engine.add_to_cart(id, "M", "Blue", snapshot))?;
    /// ```
    pub fn with_engine_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartEngine<S>) -> R,
    {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }
}

impl<S: CartStorage> Clone for CartSession<S> {
    fn clone(&self) -> Self {
        CartSession {
            engine: Arc::clone(&self.engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::storage::MemoryStorage;
    use crate::types::ProductSnapshot;
    use std::thread;

    fn snapshot() -> ProductSnapshot {
        ProductSnapshot::new("Shirt", Money::from_cents(2000), "img.png")
    }

    #[test]
    fn test_clones_share_state() {
        let session = CartSession::hydrate(MemoryStorage::new());
        let badge = session.clone();

        session
            .with_engine_mut(|engine| engine.add_to_cart("shirt1", "M", "Blue", snapshot()))
            .unwrap();

        assert_eq!(badge.with_engine(|engine| engine.cart_count()), 1);
    }

    #[test]
    fn test_concurrent_adds() {
        let session = CartSession::hydrate(MemoryStorage::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        session
                            .with_engine_mut(|engine| {
                                engine.add_to_cart("shirt1", "M", "Blue", snapshot())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(session.with_engine(|engine| engine.cart_count()), 200);
        assert_eq!(
            session.with_engine(|engine| engine.cart_amount()),
            Money::from_cents(200 * 2000)
        );
    }
}
