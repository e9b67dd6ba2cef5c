//! Persisted session records.

use super::DbPool;
use crate::{GateError, Result};

/// Session record stored in the `user_sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSession {
    /// Row ID.
    pub id: i64,
    /// Opaque session identifier.
    pub session_id: String,
    /// Owning user.
    pub user_id: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// Repository for persisted session records.
pub struct UserSessionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserSessionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Persist a session record.
    pub async fn create(&self, session_id: &str, user_id: i64) -> Result<UserSession> {
        let session = sqlx::query_as::<_, UserSession>(
            "INSERT INTO user_sessions (session_id, user_id) VALUES (?, ?)
             RETURNING id, session_id, user_id, created_at",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                GateError::AlreadyExists("session".to_string())
            }
            _ => GateError::Database(e.to_string()),
        })?;
        Ok(session)
    }

    /// Get a session record by its identifier.
    pub async fn get_by_session_id(&self, session_id: &str) -> Result<Option<UserSession>> {
        let session = sqlx::query_as::<_, UserSession>(
            "SELECT id, session_id, user_id, created_at FROM user_sessions WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(session)
    }

    /// Delete a session record. Returns false if none matched.
    pub async fn delete_by_session_id(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count the persisted sessions owned by a user.
    pub async fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}
