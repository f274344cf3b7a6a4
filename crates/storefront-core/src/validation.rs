//! # Validation Module
//!
//! Input validation for cart mutations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Product page                                                 │
//! │  ├── Size / color pickers                                              │
//! │  └── Immediate shopper feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CartEngine (Rust)                                            │
//! │  └── THIS MODULE: nothing reaches the cart without a full variant      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Hydration                                                    │
//! │  └── Stored records are sanitised, never trusted                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::VARIANT_SEPARATOR;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates one variant dimension (`"size"` or `"color"`).
///
/// ## Rules
/// - Must not be empty after trimming → [`ValidationError::NotSelected`]
/// - Must not contain [`VARIANT_SEPARATOR`] → [`ValidationError::InvalidFormat`]
///
/// ## Returns
/// The trimmed value.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_variant_part;
///
/// assert_eq!(validate_variant_part("size", " M ").unwrap(), "M");
/// assert!(validate_variant_part("size", "").is_err());
/// assert!(validate_variant_part("color", "Navy-Blue").is_err());
/// ```
pub fn validate_variant_part(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::NotSelected {
            field: field.to_string(),
        });
    }

    if value.contains(VARIANT_SEPARATOR) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must not contain '{}'", VARIANT_SEPARATOR),
        });
    }

    Ok(value.to_string())
}

/// Validates an opaque product/item identifier.
///
/// ## Rules
/// - Must not be empty after trimming
pub fn validate_item_id(item_id: &str) -> ValidationResult<()> {
    if item_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "item id".to_string(),
        });
    }

    Ok(())
}

/// Validates a snapshot price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free gifts)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
