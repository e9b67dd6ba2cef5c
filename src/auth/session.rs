//! Session storage.
//!
//! A session store maps opaque session ids to user ids. The in-memory
//! backing lives as long as the process; the persisted backing goes through
//! the `user_sessions` table and survives restarts.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{Database, UserSessionRepository};
use crate::Result;

/// A live session held by the in-memory store.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Opaque session identifier (UUID v4).
    pub session_id: String,
    /// Owning user.
    pub user_id: i64,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Process-lifetime session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `user_id`. Returns None for a non-positive id.
    pub async fn create(&self, user_id: i64) -> Option<String> {
        if user_id <= 0 {
            return None;
        }

        let mut sessions = self.sessions.write().await;
        loop {
            let session_id = new_session_id();
            if let Entry::Vacant(slot) = sessions.entry(session_id.clone()) {
                slot.insert(SessionRecord {
                    session_id: session_id.clone(),
                    user_id,
                    created_at: Utc::now(),
                });
                debug!(user_id, "Session created");
                return Some(session_id);
            }
        }
    }

    /// Resolve a session id to its user id.
    pub async fn lookup(&self, session_id: &str) -> Option<i64> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|record| record.user_id)
    }

    /// Remove a session. Returns false if it was not present.
    pub async fn destroy(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Session store backed by the `user_sessions` table.
#[derive(Debug, Clone)]
pub struct PersistedSessionStore {
    db: Database,
}

impl PersistedSessionStore {
    /// Create a store over the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create and persist a session for `user_id`. Returns None for a non-positive id.
    pub async fn create(&self, user_id: i64) -> Result<Option<String>> {
        if user_id <= 0 {
            return Ok(None);
        }

        let session_id = new_session_id();
        UserSessionRepository::new(self.db.pool())
            .create(&session_id, user_id)
            .await?;
        info!(user_id, "Persisted session created");
        Ok(Some(session_id))
    }

    /// Resolve a session id to its user id.
    pub async fn lookup(&self, session_id: &str) -> Result<Option<i64>> {
        let session = UserSessionRepository::new(self.db.pool())
            .get_by_session_id(session_id)
            .await?;
        Ok(session.map(|s| s.user_id))
    }

    /// Delete the persisted record. Returns false if none matched.
    pub async fn destroy(&self, session_id: &str) -> Result<bool> {
        UserSessionRepository::new(self.db.pool())
            .delete_by_session_id(session_id)
            .await
    }
}

/// Session store with one of the two backings.
#[derive(Debug)]
pub enum SessionStore {
    /// Sessions held in process memory.
    Memory(MemorySessionStore),
    /// Sessions persisted to the database.
    Persisted(PersistedSessionStore),
}

impl SessionStore {
    /// Fresh in-memory store.
    pub fn memory() -> Self {
        SessionStore::Memory(MemorySessionStore::new())
    }

    /// Persisted store over `db`.
    pub fn persisted(db: Database) -> Self {
        SessionStore::Persisted(PersistedSessionStore::new(db))
    }

    /// Whether sessions survive a restart.
    pub fn is_persisted(&self) -> bool {
        matches!(self, SessionStore::Persisted(_))
    }

    /// Create a session for `user_id`.
    pub async fn create(&self, user_id: i64) -> Result<Option<String>> {
        match self {
            SessionStore::Memory(store) => Ok(store.create(user_id).await),
            SessionStore::Persisted(store) => store.create(user_id).await,
        }
    }

    /// Resolve a session id to its user id. Empty ids never resolve.
    pub async fn lookup(&self, session_id: &str) -> Result<Option<i64>> {
        if session_id.is_empty() {
            return Ok(None);
        }
        match self {
            SessionStore::Memory(store) => Ok(store.lookup(session_id).await),
            SessionStore::Persisted(store) => store.lookup(session_id).await,
        }
    }

    /// Destroy a session. Returns false if it was absent.
    pub async fn destroy(&self, session_id: &str) -> Result<bool> {
        if session_id.is_empty() {
            return Ok(false);
        }
        match self {
            SessionStore::Memory(store) => Ok(store.destroy(session_id).await),
            SessionStore::Persisted(store) => store.destroy(session_id).await,
        }
    }
}
