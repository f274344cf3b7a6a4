//! # Session State Repository
//!
//! Reads and upserts the persisted records of shopper sessions.
//!
//! ## Table Shape
//! ```text
//! ┌──────────────────────────────────────┬────────────┬──────────┬────────────┐
//! │ session_id                           │ record_key │ payload  │ updated_at │
//! ├──────────────────────────────────────┼────────────┼──────────┼────────────┤
//! │ 6f1c..                               │ cartItems  │ {...}    │ 2026-..    │
//! │ 6f1c..                               │ wishList   │ [...]    │ 2026-..    │
//! └──────────────────────────────────────┴────────────┴──────────┴────────────┘
//!   PRIMARY KEY (session_id, record_key) → a write is one upsert
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository for session record operations.
#[derive(Debug, Clone)]
pub struct SessionStateRepository {
    pool: SqlitePool,
}

impl SessionStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionStateRepository { pool }
    }

    /// Gets one record of a session.
    pub async fn get(&self, session_id: &str, record_key: &str) -> DbResult<Option<String>> {
        let payload = sqlx::query_scalar::<_, String>(
            r#"
            SELECT payload
            FROM session_state
            WHERE session_id = ?1 AND record_key = ?2
            "#,
        )
        .bind(session_id)
        .bind(record_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payload)
    }

    /// Loads every record of a session as `(record_key, payload)` pairs.
    pub async fn load_session(&self, session_id: &str) -> DbResult<Vec<(String, String)>> {
        let rows = sqlx::query(
            r#"
            SELECT record_key, payload
            FROM session_state
            WHERE session_id = ?1
            ORDER BY record_key
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| -> DbResult<(String, String)> {
                Ok((
                    row.try_get::<String, _>("record_key")?,
                    row.try_get::<String, _>("payload")?,
                ))
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(session_id = %session_id, records = records.len(), "Loaded session");
        Ok(records)
    }

    /// Replaces a record wholesale (insert or update).
    ///
    /// ## Example
    /// ```rust,ignore
    /// repo.put(&session_id, "cartItems", &payload).await?;
    /// ```
    pub async fn put(&self, session_id: &str, record_key: &str, payload: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO session_state (session_id, record_key, payload, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (session_id, record_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(record_key)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(
            session_id = %session_id,
            record_key = %record_key,
            bytes = payload.len(),
            "Session record written"
        );
        Ok(())
    }

    /// Deletes all records of a session.
    ///
    /// ## Returns
    /// Number of deleted rows.
    pub async fn delete_session(&self, session_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM session_state WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes records not written since `cutoff` (abandoned sessions).
    ///
    /// ## Returns
    /// Number of deleted rows.
    pub async fn delete_stale(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM session_state WHERE updated_at < ?1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts distinct sessions with at least one record.
    pub async fn count_sessions(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT session_id) FROM session_state")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    async fn repo() -> SessionStateRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.session_state()
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let repo = repo().await;
        assert_eq!(repo.get("s1", "cartItems").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_overwrite() {
        let repo = repo().await;

        repo.put("s1", "cartItems", "{}").await.unwrap();
        repo.put("s1", "cartItems", r#"{"a":1}"#).await.unwrap();

        assert_eq!(
            repo.get("s1", "cartItems").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert_eq!(repo.count_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let repo = repo().await;

        repo.put("s1", "cartItems", "{}").await.unwrap();
        repo.put("s1", "wishList", "[]").await.unwrap();
        repo.put("s2", "cartItems", r#"{"x":1}"#).await.unwrap();

        let s1 = repo.load_session("s1").await.unwrap();
        assert_eq!(
            s1,
            vec![
                ("cartItems".to_string(), "{}".to_string()),
                ("wishList".to_string(), "[]".to_string()),
            ]
        );

        assert_eq!(repo.delete_session("s1").await.unwrap(), 2);
        assert!(repo.load_session("s1").await.unwrap().is_empty());
        assert!(repo.get("s2", "cartItems").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_stale() {
        let repo = repo().await;
        repo.put("s1", "cartItems", "{}").await.unwrap();

        let past = Utc::now() - Duration::days(30);
        assert_eq!(repo.delete_stale(past).await.unwrap(), 0);

        let future = Utc::now() + Duration::days(1);
        assert_eq!(repo.delete_stale(future).await.unwrap(), 1);
        assert_eq!(repo.count_sessions().await.unwrap(), 0);
    }
}
