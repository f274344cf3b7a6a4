//! # Storefront Configuration
//!
//! Runtime settings for the storefront cart service.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_DB_PATH=/var/lib/storefront/storefront.db               │
//! │     STOREFRONT_SESSION_ID=6f1c...                                      │
//! │     STOREFRONT_CURRENCY=EUR                                            │
//! │     STOREFRONT_DELIVERY_FEE=500   (minor units)                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.storefront/ (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./storefront.db, USD, fee 0, generated session id                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [database]
//! path = "./storefront.db"
//! max_connections = 5
//!
//! [session]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//!
//! [checkout]
//! currency = "USD"
//! delivery_fee = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storefront_core::{format_amount, Money};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::pool::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./storefront.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[session]` section.
///
/// Without an `id` (file or `STOREFRONT_SESSION_ID`) each load generates a
/// fresh UUID v4, so two processes do not share a session. [`save`] writes
/// the generated id out, pinning it for later loads.
///
/// [`save`]: StorefrontConfig::save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Configured shopper session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip, default = "new_session_id")]
    generated_id: String,
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            id: None,
            generated_id: new_session_id(),
        }
    }
}

/// `[checkout]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// ISO-4217 currency code used to display amounts.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Flat delivery fee in minor units.
    #[serde(default)]
    pub delivery_fee: i64,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            currency: default_currency(),
            delivery_fee: 0,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with_env(config_path, |name| std::env::var(name).ok())
    }

    /// Same as [`load`](Self::load) with a custom environment lookup.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(env);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a config file (no env overrides, no validation).
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading storefront config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    ///
    /// The effective session id is always written, generated or not.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut pinned = self.clone();
        pinned.session.id = Some(self.session_id().to_string());

        let contents = toml::to_string_pretty(&pinned)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.session_id().trim().is_empty() {
            return Err(ConfigError::Invalid("session id must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.checkout.delivery_fee < 0 {
            return Err(ConfigError::Invalid(
                "delivery_fee must not be negative".into(),
            ));
        }

        format_amount(&self.checkout.currency, Money::zero())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env("STOREFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(id) = env("STOREFRONT_SESSION_ID") {
            debug!(session_id = %id, "Overriding session id from environment");
            self.session.id = Some(id);
        }

        if let Some(currency) = env("STOREFRONT_CURRENCY") {
            self.checkout.currency = currency;
        }

        if let Some(fee) = env("STOREFRONT_DELIVERY_FEE") {
            match fee.parse::<i64>() {
                Ok(fee) => self.checkout.delivery_fee = fee,
                Err(_) => warn!(fee = %fee, "Ignoring unparseable delivery fee in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pool settings for [`Database::new`](crate::Database::new).
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    pub fn session_id(&self) -> &str {
        self.session
            .id
            .as_deref()
            .unwrap_or(&self.session.generated_id)
    }

    /// `false` when [`session_id`](Self::session_id) was generated by this load.
    pub fn session_pinned(&self) -> bool {
        self.session.id.is_some()
    }

    pub fn delivery_fee(&self) -> Money {
        Money::from_cents(self.checkout.delivery_fee)
    }

    /// Formats an amount in the configured currency.
    pub fn format(&self, amount: Money) -> String {
        format_amount(&self.checkout.currency, amount).unwrap_or_else(|_| amount.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn missing_file() -> Option<PathBuf> {
        Some(PathBuf::from("/nonexistent/storefront.toml"))
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::load_with_env(missing_file(), env_from(&[])).unwrap();

        assert_eq!(config.database.path, PathBuf::from("./storefront.db"));
        assert_eq!(config.checkout.currency, "USD");
        assert_eq!(config.delivery_fee(), Money::zero());
        assert!(!config.session_id().is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let env = env_from(&[
            ("STOREFRONT_DB_PATH", "/tmp/shop.db"),
            ("STOREFRONT_SESSION_ID", "shopper-42"),
            ("STOREFRONT_CURRENCY", "EUR"),
            ("STOREFRONT_DELIVERY_FEE", "750"),
        ]);
        let config = StorefrontConfig::load_with_env(missing_file(), env).unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.session_id(), "shopper-42");
        assert_eq!(config.checkout.currency, "EUR");
        assert_eq!(config.delivery_fee(), Money::from_cents(750));
    }

    #[test]
    fn test_unparseable_fee_is_ignored() {
        let env = env_from(&[("STOREFRONT_DELIVERY_FEE", "five")]);
        let config = StorefrontConfig::load_with_env(missing_file(), env).unwrap();
        assert_eq!(config.checkout.delivery_fee, 0);
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(
            &path,
            r#"
            [session]
            id = "from-file"

            [checkout]
            currency = "GBP"
            delivery_fee = 300
            "#,
        )
        .unwrap();

        let env = env_from(&[("STOREFRONT_DELIVERY_FEE", "0")]);
        let config = StorefrontConfig::load_with_env(Some(path), env).unwrap();

        assert_eq!(config.session_id(), "from-file");
        assert_eq!(config.checkout.currency, "GBP");
        assert_eq!(config.delivery_fee(), Money::zero());
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_validation() {
        let mut config = StorefrontConfig::default();
        assert!(config.validate().is_ok());

        config.checkout.currency = "ZZZ".to_string();
        assert!(config.validate().is_err());

        config.checkout.currency = "usd".to_string();
        assert!(config.validate().is_ok());

        config.checkout.delivery_fee = -1;
        assert!(config.validate().is_err());

        config.checkout.delivery_fee = 0;
        config.session.id = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storefront.toml");

        let mut config = StorefrontConfig::default();
        config.checkout.delivery_fee = 1000;
        config.save(Some(path.clone())).unwrap();

        let reloaded = StorefrontConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.session_id(), config.session_id());
        assert_eq!(reloaded.checkout.delivery_fee, 1000);
    }

    #[test]
    fn test_session_id_generated_per_load_unless_configured() {
        let first = StorefrontConfig::load_with_env(missing_file(), env_from(&[])).unwrap();
        let second = StorefrontConfig::load_with_env(missing_file(), env_from(&[])).unwrap();
        assert!(!first.session_pinned());
        assert_ne!(first.session_id(), second.session_id());

        let env = || env_from(&[("STOREFRONT_SESSION_ID", "shopper-42")]);
        let first = StorefrontConfig::load_with_env(missing_file(), env()).unwrap();
        let second = StorefrontConfig::load_with_env(missing_file(), env()).unwrap();
        assert!(first.session_pinned());
        assert_eq!(first.session_id(), second.session_id());
    }

    #[test]
    fn test_save_pins_generated_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.toml");

        let config = StorefrontConfig::load_with_env(Some(path.clone()), env_from(&[])).unwrap();
        assert!(!config.session_pinned());
        config.save(Some(path.clone())).unwrap();

        let first = StorefrontConfig::load_with_env(Some(path.clone()), env_from(&[])).unwrap();
        let second = StorefrontConfig::load_with_env(Some(path), env_from(&[])).unwrap();
        assert!(first.session_pinned());
        assert_eq!(first.session_id(), config.session_id());
        assert_eq!(second.session_id(), config.session_id());
    }

    #[test]
    fn test_format_uses_currency() {
        let config = StorefrontConfig::default();
        assert_eq!(config.format(Money::from_cents(4000)), "$40.00");
    }
}
