//! User repository.
//!
//! CRUD operations for the `users` table.

use sqlx::QueryBuilder;

use super::user::{NewUser, User, UserUpdate};
use super::DbPool;
use crate::{GateError, Result};

const USER_COLUMNS: &str =
    "id, email, hashed_password, session_id, reset_token, created_at, updated_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// The email uniqueness check and the insert are one statement: a
    /// duplicate email fails with [`GateError::AlreadyExists`].
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (email, hashed_password) VALUES (?, ?)")
            .bind(&new_user.email)
            .bind(&new_user.hashed_password)
            .execute(self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => {
                    GateError::AlreadyExists(format!("user {}", new_user.email))
                }
                _ => GateError::Database(e.to_string()),
            })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| GateError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get the user whose stored session id equals `session_id`.
    pub async fn get_by_session_id(&self, session_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE session_id = ? LIMIT 1"
        ))
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get the user holding the given reset token.
    pub async fn get_by_reset_token(&self, reset_token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_token = ? LIMIT 1"
        ))
        .bind(reset_token)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update are modified.
    /// Returns the updated user, or None if not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref hashed_password) = update.hashed_password {
            separated.push("hashed_password = ");
            separated.push_bind_unseparated(hashed_password);
        }
        if let Some(ref session_id) = update.session_id {
            separated.push("session_id = ");
            separated.push_bind_unseparated(session_id.clone());
        }
        if let Some(ref reset_token) = update.reset_token {
            separated.push("reset_token = ");
            separated.push_bind_unseparated(reset_token.clone());
        }
        separated.push("updated_at = datetime('now')");

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Replace the password of the user holding `reset_token` and clear the token.
    ///
    /// The match and the update are one statement, so a token is consumed at
    /// most once. Returns None if no user holds the token.
    pub async fn consume_reset_token(
        &self,
        reset_token: &str,
        hashed_password: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET hashed_password = ?, reset_token = NULL, updated_at = datetime('now')
             WHERE reset_token = ?
             RETURNING {USER_COLUMNS}"
        ))
        .bind(hashed_password)
        .bind(reset_token)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Check if an email is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(self.pool)
            .await?;
        Ok(exists.0)
    }
}
