//! # Variant Keys
//!
//! A variant is one purchasable size/color combination of a product, and it
//! is the real unit of quantity tracking in the cart.
//!
//! ```text
//!   size "M" + color "Blue"  ──►  VariantKey  ──►  "M-Blue"  (stored form)
//!                                      ▲
//!   "M-Blue".parse()  ─────────────────┘   split on '-' → exactly 2 parts
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::validation::{validate_variant_part, ValidationResult};
use crate::VARIANT_SEPARATOR;

/// Size/color pair identifying a variant of an item.
///
/// Always holds two non-empty values free of [`VARIANT_SEPARATOR`], so the
/// string form can be split back into exactly `(size, color)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct VariantKey {
    size: String,
    color: String,
}

impl VariantKey {
    /// Builds a key from shopper input, trimming both parts.
    ///
    /// ## Errors
    /// - [`ValidationError::NotSelected`] if size or color is empty
    /// - [`ValidationError::InvalidFormat`] if either contains the separator
    pub fn new(size: &str, color: &str) -> ValidationResult<Self> {
        let size = validate_variant_part("size", size)?;
        let color = validate_variant_part("color", color)?;
        Ok(VariantKey { size, color })
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.size, VARIANT_SEPARATOR, self.color)
    }
}

impl FromStr for VariantKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(VARIANT_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(size), Some(color), None) => VariantKey::new(size, color),
            _ => Err(ValidationError::InvalidFormat {
                field: "variant key".to_string(),
                reason: format!("'{}' is not <size>{}<color>", s, VARIANT_SEPARATOR),
            }),
        }
    }
}

impl TryFrom<String> for VariantKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VariantKey> for String {
    fn from(key: VariantKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_split() {
        let key = VariantKey::new("M", "Blue").unwrap();
        assert_eq!(key.to_string(), "M-Blue");

        let parsed: VariantKey = "M-Blue".parse().unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.size(), "M");
        assert_eq!(parsed.color(), "Blue");
    }

    #[test]
    fn test_rejects_keys_that_do_not_split_in_two() {
        assert!("M".parse::<VariantKey>().is_err());
        assert!("M-Blue-Extra".parse::<VariantKey>().is_err());
        assert!("-Blue".parse::<VariantKey>().is_err());
        assert!("M-".parse::<VariantKey>().is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let key = VariantKey::new("XL", "Red").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"XL-Red\"");

        let bad: Result<VariantKey, _> = serde_json::from_str("\"XLRed\"");
        assert!(bad.is_err());
    }
}
