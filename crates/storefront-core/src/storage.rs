//! # Storage Seam
//!
//! The engine persists two independent records per shopper and never knows
//! where they live. Backends implement [`CartStorage`].
//!
//! ## Records
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RecordKey::Cart      "cartItems"  { itemId: { name, price, image,      │
//! │                                                variants } }             │
//! │  RecordKey::WishList  "wishList"   [ Product, ... ]                     │
//! │                                                                         │
//! │  read  ── once, at hydration                                            │
//! │  write ── after every mutation, whole record, best effort               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backends
//! - [`MemoryStorage`] (here) - tests, previews
//! - `SqliteSessionStore` (storefront-db) - SQLite with a write-behind task

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

// =============================================================================
// Record Keys
// =============================================================================

/// Identifies one of the two persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Cart,
    WishList,
}

impl RecordKey {
    /// Name the record is stored under.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecordKey::Cart => "cartItems",
            RecordKey::WishList => "wishList",
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A storage backend failed to read or write a record.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The aggregate could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend rejected the operation (quota, I/O, database).
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The backend has been shut down.
    #[error("Storage is closed")]
    Closed,
}

/// Non-fatal report that a write-back did not happen.
///
/// The in-memory mutation that triggered the write has already succeeded
/// and stays in place.
#[derive(Debug, Error)]
#[error("Failed to persist {key}: {source}")]
pub struct PersistenceWarning {
    pub key: RecordKey,
    #[source]
    pub source: StorageError,
}

// =============================================================================
// Storage Trait
// =============================================================================

/// Key/value persistence for the engine's records.
///
/// Implementations must not block on slow I/O inside `write`: the engine
/// calls it synchronously after each mutation.
pub trait CartStorage {
    /// Reads a record; `Ok(None)` when it was never written.
    fn read(&self, key: RecordKey) -> Result<Option<String>, StorageError>;

    /// Replaces a record wholesale.
    fn write(&self, key: RecordKey, payload: String) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for Arc<T> {
    fn read(&self, key: RecordKey) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: RecordKey, payload: String) -> Result<(), StorageError> {
        (**self).write(key, payload)
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process storage backend.
///
/// ## Usage
/// ```rust
/// use std::sync::Arc;
/// use storefront_core::{CartEngine, CartStorage, MemoryStorage, RecordKey};
///
/// let storage = Arc::new(MemoryStorage::new());
/// let mut engine = CartEngine::hydrate(Arc::clone(&storage));
/// engine.clear_cart();
///
/// assert_eq!(storage.read(RecordKey::Cart).unwrap().as_deref(), Some("{}"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<RecordKey, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Creates storage pre-filled with a record (builder style).
    pub fn with_record(self, key: RecordKey, payload: impl Into<String>) -> Self {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, payload.into());
        self
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: RecordKey) -> Result<Option<String>, StorageError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(&key).cloned())
    }

    fn write(&self, key: RecordKey, payload: String) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(key, payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_names() {
        assert_eq!(RecordKey::Cart.as_str(), "cartItems");
        assert_eq!(RecordKey::WishList.to_string(), "wishList");
    }

    #[test]
    fn test_memory_storage_read_write() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read(RecordKey::Cart).unwrap(), None);

        storage.write(RecordKey::Cart, "{}".to_string()).unwrap();
        assert_eq!(storage.read(RecordKey::Cart).unwrap().as_deref(), Some("{}"));
        assert_eq!(storage.read(RecordKey::WishList).unwrap(), None);
    }

    #[test]
    fn test_warning_message() {
        let warning = PersistenceWarning {
            key: RecordKey::WishList,
            source: StorageError::Backend("quota exceeded".to_string()),
        };
        assert_eq!(
            warning.to_string(),
            "Failed to persist wishList: Storage backend error: quota exceeded"
        );
    }
}
