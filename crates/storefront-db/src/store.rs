//! # SQLite Session Store
//!
//! [`CartStorage`] backend that keeps one shopper session in SQLite.
//!
//! ## Write-Behind Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SqliteSessionStore                                   │
//! │                                                                         │
//! │  open(db, session_id).await                                            │
//! │       │                                                                 │
//! │       ├── SELECT record_key, payload ──► cache                         │
//! │       └── tokio::spawn(writer loop)                                    │
//! │                                                                         │
//! │  CartEngine (sync)                                                     │
//! │       │                                                                 │
//! │       ├── read(key)  ──► cache (no I/O)                                │
//! │       │                                                                 │
//! │       └── write(key, payload)                                          │
//! │              │                                                          │
//! │              ├── cache[key] = payload                                  │
//! │              └── mpsc::unbounded ──► ┌────────────────────────────┐    │
//! │                                       │      Writer Task            │    │
//! │  flush().await ── Flush(ack) ───────► │  Write  → UPSERT row        │    │
//! │  close().await ── Shutdown(ack) ────► │  Flush  → ack               │    │
//! │                                       │  Shutdown → ack, stop       │    │
//! │                                       └────────────────────────────┘    │
//! │                                                                         │
//! │  Commands are handled strictly in send order, so a Flush ack means    │
//! │  every earlier write has been applied (or logged as failed).           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use storefront_core::{CartStorage, RecordKey, StorageError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::session_state::SessionStateRepository;

const RECORD_KEYS: [RecordKey; 2] = [RecordKey::Cart, RecordKey::WishList];

/// Commands processed by the writer task.
#[derive(Debug)]
enum WriterCommand {
    Write { key: RecordKey, payload: String },
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// One shopper session backed by SQLite.
///
/// ## Usage
/// ```rust,ignore
/// let store = Arc::new(SqliteSessionStore::open(&db, &session_id).await?);
/// let session = CartSession::hydrate(Arc::clone(&store));
///
/// session.with_engine_mut(|engine| engine.add_to_cart(id, "M", "Blue", snapshot))?;
///
/// // Before shutdown
/// store.close().await?;
/// ```
#[derive(Debug)]
pub struct SqliteSessionStore {
    session_id: String,
    cache: Mutex<HashMap<RecordKey, String>>,
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl SqliteSessionStore {
    /// Loads the session's records and starts its writer task.
    ///
    /// Must be called from within a tokio runtime; the writer task is
    /// spawned on it.
    pub async fn open(db: &Database, session_id: impl Into<String>) -> DbResult<Self> {
        let session_id = session_id.into();
        let repo = db.session_state();

        let mut cache = HashMap::new();
        for (name, payload) in repo.load_session(&session_id).await? {
            match RECORD_KEYS.iter().find(|key| key.as_str() == name) {
                Some(key) => {
                    cache.insert(*key, payload);
                }
                None => debug!(session_id = %session_id, record_key = %name, "Ignoring unknown record"),
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(repo, session_id.clone(), rx));

        info!(
            session_id = %session_id,
            records = cache.len(),
            "Session store opened"
        );

        Ok(SqliteSessionStore {
            session_id,
            cache: Mutex::new(cache),
            tx,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Waits until every write queued so far has been applied.
    pub async fn flush(&self) -> DbResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriterCommand::Flush(ack_tx))
            .map_err(|_| DbError::WriterStopped)?;
        ack_rx.await.map_err(|_| DbError::WriterStopped)
    }

    /// Applies every queued write, then stops the writer task.
    ///
    /// Writes after this return `StorageError::Closed`.
    pub async fn close(&self) -> DbResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriterCommand::Shutdown(ack_tx))
            .map_err(|_| DbError::WriterStopped)?;
        ack_rx.await.map_err(|_| DbError::WriterStopped)
    }

    /// True once the writer task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl CartStorage for SqliteSessionStore {
    fn read(&self, key: RecordKey) -> Result<Option<String>, StorageError> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.get(&key).cloned())
    }

    fn write(&self, key: RecordKey, payload: String) -> Result<(), StorageError> {
        self.tx
            .send(WriterCommand::Write {
                key,
                payload: payload.clone(),
            })
            .map_err(|_| StorageError::Closed)?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(key, payload);
        Ok(())
    }
}

/// Writer loop: applies commands in order until shutdown or until every
/// sender is gone.
async fn run_writer(
    repo: SessionStateRepository,
    session_id: String,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
) {
    debug!(session_id = %session_id, "Session writer started");

    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Write { key, payload } => {
                apply_write(&repo, &session_id, key, &payload).await;
            }
            WriterCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            WriterCommand::Shutdown(ack) => {
                rx.close();
                // Commands sent before the receiver closed are still applied
                while let Some(pending) = rx.recv().await {
                    match pending {
                        WriterCommand::Write { key, payload } => {
                            apply_write(&repo, &session_id, key, &payload).await;
                        }
                        WriterCommand::Flush(ack) | WriterCommand::Shutdown(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                let _ = ack.send(());
                break;
            }
        }
    }

    info!(session_id = %session_id, "Session writer stopped");
}

async fn apply_write(repo: &SessionStateRepository, session_id: &str, key: RecordKey, payload: &str) {
    if let Err(e) = repo.put(session_id, key.as_str(), payload).await {
        warn!(
            session_id = %session_id,
            record_key = %key,
            error = %e,
            "Failed to write session record"
        );
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
