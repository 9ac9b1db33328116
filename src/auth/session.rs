//! Session Store
//!
//! Tracks one last-activity timestamp per user and implements the
//! sliding-window staleness check used by the authentication gate.

use chrono::Utc;

use crate::common::{AppError, AppResult};
use crate::db::DbService;
use crate::db::models::SessionRecord;

/// Session store — one row per user, last-writer-wins on the timestamp
///
/// Concurrent requests from the same user race on `touch`; the store does
/// not serialize them beyond what the storage transaction provides.
#[derive(Clone)]
pub struct SessionStore {
    db: DbService,
    /// Inactivity window in milliseconds
    timeout_ms: i64,
}

impl SessionStore {
    pub fn new(db: DbService, timeout_ms: i64) -> Self {
        Self { db, timeout_ms }
    }

    /// Record activity now, creating the session row if absent
    pub async fn touch(&self, user_id: i64) -> AppResult<()> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            "INSERT INTO sessions (user_id, last_active) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET last_active = excluded.last_active",
        )
        .bind(user_id)
        .bind(now)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Read a user's session, failing with `NotFound` if none exists
    pub async fn read(&self, user_id: i64) -> AppResult<SessionRecord> {
        let session =
            sqlx::query_as::<_, SessionRecord>("SELECT * FROM sessions WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;

        session.ok_or_else(|| AppError::not_found(format!("Session for user {user_id} not found")))
    }

    /// Delete a user's session; no-op when absent
    pub async fn expire(&self, user_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Slide the session window for one authenticated request.
    ///
    /// Snapshots the pre-touch timestamp `t0`, records this request as
    /// activity, re-reads the updated timestamp `t1`, and treats the
    /// session as expired when `t1 - t0` exceeds the inactivity window.
    /// An expired session is deleted and the caller must re-authenticate.
    ///
    /// Note the exact semantics: the delta between two *consecutive*
    /// touches is measured, so this really asks "was the prior access too
    /// long ago". A session's very first slide after login measures the
    /// gap since the login touch.
    pub async fn slide(&self, user_id: i64) -> AppResult<()> {
        // Read-before-write: the staleness check needs the pre-touch value
        let before = self.read(user_id).await?;

        self.touch(user_id).await?;
        let after = self.read(user_id).await?;

        let elapsed_ms = after.last_active - before.last_active;
        if elapsed_ms > self.timeout_ms {
            self.expire(user_id).await?;
            tracing::warn!(user_id, elapsed_ms, "Session expired, record deleted");
            return Err(AppError::session_expired());
        }

        Ok(())
    }
}
