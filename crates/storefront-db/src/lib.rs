//! # storefront-db: Persistence Layer for the Storefront Cart
//!
//! This crate keeps shopper sessions in SQLite and exposes them to the cart
//! engine as a [`CartStorage`](storefront_core::CartStorage) backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  CartSession / CartEngine (storefront-core)                            │
//! │       │ read / write (sync)                                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    store      │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ SqliteSession │───►│ SessionState  │    │  (embedded)  │  │   │
//! │  │   │ Store + writer│    │ Repository    │    │ 001_session_ │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    │ state.sql    │  │   │
//! │  │   ┌───────────────┐            │            └──────────────┘  │   │
//! │  │   │    config     │    ┌───────▼───────┐                      │   │
//! │  │   │StorefrontConf │    │ Database/pool │                      │   │
//! │  │   └───────────────┘    └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (storefront.db)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Session record repository
//! - [`store`] - Write-behind `CartStorage` backend
//! - [`config`] - File/environment configuration
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_core::CartSession;
//! use storefront_db::{Database, SqliteSessionStore, StorefrontConfig};
//!
//! let config = StorefrontConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let store = SqliteSessionStore::open(&db, config.session_id()).await?;
//! let session = CartSession::hydrate(store);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, ConfigResult, StorefrontConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::session_state::SessionStateRepository;
pub use store::SqliteSessionStore;

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,storefront=debug,sqlx=warn";

/// Initializes the tracing subscriber for binaries.
///
/// ## Log Levels
/// Set via `RUST_LOG` environment variable:
/// - `RUST_LOG=debug` - Show debug logs
/// - `RUST_LOG=storefront=trace` - Trace for storefront crates only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Calling it twice is harmless; the second call does nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
