//! # Repository Module
//!
//! Database repository implementations for the storefront session store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SqliteSessionStore (open / writer task)                              │
//! │       │                                                                 │
//! │       │  db.session_state().put(session, "cartItems", payload)         │
//! │       ▼                                                                 │
//! │  SessionStateRepository                                                │
//! │  ├── get(&self, session_id, record_key)                                │
//! │  ├── load_session(&self, session_id)                                   │
//! │  ├── put(&self, session_id, record_key, payload)                       │
//! │  └── delete_session / delete_stale                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SessionStateRepository`](session_state::SessionStateRepository) - Per-session records

pub mod session_state;
