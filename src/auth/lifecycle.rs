//! User lifecycle: registration, login, per-user sessions and password reset.
//!
//! Sessions here are the single session id stored on the user row, as used
//! by the account endpoints. Missing records surface as `None`/`false` for
//! lookups and as [`GateError::NotFound`] for the reset flow.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::db::{Database, NewUser, User, UserRepository, UserUpdate};
use crate::{GateError, Result};

/// Service wrapping the user store and the credential verifier.
#[derive(Debug, Clone)]
pub struct UserLifecycle {
    db: Database,
}

impl UserLifecycle {
    /// Create a service over `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    /// Register a new user.
    ///
    /// Fails with [`GateError::AlreadyExists`] when the email is taken. The
    /// store's unique constraint decides, so concurrent registrations of the
    /// same email yield exactly one user. A blank email or an empty password
    /// is a [`GateError::Validation`].
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        if email.trim().is_empty() {
            return Err(GateError::Validation("email must not be blank".to_string()));
        }
        if password.is_empty() {
            return Err(GateError::Validation("password must not be empty".to_string()));
        }

        let digest = hash_password(password)?;
        let user = self.repo().create(&NewUser::new(email, digest)).await?;

        info!(user_id = user.id, email = %user.email, "New user registered");
        Ok(user)
    }

    /// Whether `password` is correct for the user registered under `email`.
    pub async fn valid_login(&self, email: &str, password: &str) -> Result<bool> {
        let Some(user) = self.repo().get_by_email(email).await? else {
            return Ok(false);
        };
        Ok(verify_password(password, &user.hashed_password))
    }

    /// Issue a new session id for the user, replacing any previous one.
    pub async fn create_session(&self, email: &str) -> Result<Option<String>> {
        let repo = self.repo();
        let Some(user) = repo.get_by_email(email).await? else {
            return Ok(None);
        };

        let session_id = Uuid::new_v4().to_string();
        repo.update(user.id, &UserUpdate::new().session_id(Some(session_id.clone())))
            .await?;

        debug!(user_id = user.id, "Login session stored");
        Ok(Some(session_id))
    }

    /// The user whose stored session id is `session_id`.
    pub async fn resolve_session(&self, session_id: Option<&str>) -> Result<Option<User>> {
        match session_id {
            Some(sid) if !sid.is_empty() => self.repo().get_by_session_id(sid).await,
            _ => Ok(None),
        }
    }

    /// Clear the stored session id. Unknown users are ignored.
    pub async fn destroy_session(&self, user_id: i64) -> Result<()> {
        let cleared = self
            .repo()
            .update(user_id, &UserUpdate::new().session_id(None))
            .await?;
        if cleared.is_none() {
            debug!(user_id, "destroy_session: no such user");
        }
        Ok(())
    }

    /// Generate and store a password-reset token for `email`.
    pub async fn issue_reset_token(&self, email: &str) -> Result<String> {
        let repo = self.repo();
        let user = repo
            .get_by_email(email)
            .await?
            .ok_or_else(|| GateError::NotFound(format!("user {email}")))?;

        let token = Uuid::new_v4().to_string();
        repo.update(user.id, &UserUpdate::new().reset_token(Some(token.clone())))
            .await?;

        info!(user_id = user.id, "Reset token issued");
        Ok(token)
    }

    /// Set a new password using a reset token, consuming the token.
    pub async fn redeem_reset_token(&self, reset_token: &str, new_password: &str) -> Result<()> {
        let repo = self.repo();
        if reset_token.is_empty() || repo.get_by_reset_token(reset_token).await?.is_none() {
            return Err(GateError::NotFound("reset token".to_string()));
        }

        let digest = hash_password(new_password)?;
        match repo.consume_reset_token(reset_token, &digest).await? {
            Some(user) => {
                info!(user_id = user.id, "Password reset");
                Ok(())
            }
            None => {
                // Redeemed by a concurrent request in between.
                warn!("Reset token consumed concurrently");
                Err(GateError::NotFound("reset token".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn service() -> UserLifecycle {
        UserLifecycle::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_register() {
        let svc = service().await;

        let user = svc.register("u@x.com", "pw1").await.unwrap();
        assert_eq!(user.email, "u@x.com");
        assert_ne!(user.hashed_password, "pw1");
        assert!(verify_password("pw1", &user.hashed_password));
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let svc = service().await;

        svc.register("u@x.com", "pw1").await.unwrap();
        let result = svc.register("u@x.com", "pw2").await;
        assert!(matches!(result, Err(GateError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_blank_input() {
        let svc = service().await;

        assert!(matches!(
            svc.register("  ", "pw1").await,
            Err(GateError::Validation(_))
        ));
        assert!(matches!(
            svc.register("u@x.com", "").await,
            Err(GateError::Validation(_))
        ));
        assert!(!svc.valid_login("u@x.com", "").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_register_single_winner() {
        let svc = Arc::new(service().await);

        let mut handles = Vec::new();
        for i in 0..4 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.register("a@b.com", &format!("pw{i}")).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(GateError::AlreadyExists(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 3);
    }

    #[tokio::test]
    async fn test_valid_login() {
        let svc = service().await;
        svc.register("u@x.com", "pw1").await.unwrap();

        assert!(svc.valid_login("u@x.com", "pw1").await.unwrap());
        assert!(!svc.valid_login("u@x.com", "wrong").await.unwrap());
        assert!(!svc.valid_login("nobody@x.com", "pw1").await.unwrap());
    }

    #[tokio::test]
    async fn test_login_session_scenario() {
        let svc = service().await;
        let user = svc.register("u@x.com", "pw1").await.unwrap();
        assert!(matches!(
            svc.register("u@x.com", "pw1").await,
            Err(GateError::AlreadyExists(_))
        ));
        assert!(!svc.valid_login("u@x.com", "wrong").await.unwrap());
        assert!(svc.valid_login("u@x.com", "pw1").await.unwrap());

        let sid = svc.create_session("u@x.com").await.unwrap().unwrap();
        let resolved = svc.resolve_session(Some(&sid)).await.unwrap().unwrap();
        assert_eq!(resolved.email, "u@x.com");

        svc.destroy_session(user.id).await.unwrap();
        assert!(svc.resolve_session(Some(&sid)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_session_replaces_old() {
        let svc = service().await;
        svc.register("u@x.com", "pw1").await.unwrap();

        let first = svc.create_session("u@x.com").await.unwrap().unwrap();
        let second = svc.create_session("u@x.com").await.unwrap().unwrap();
        assert_ne!(first, second);
        assert!(svc.resolve_session(Some(&first)).await.unwrap().is_none());
        assert!(svc.resolve_session(Some(&second)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_create_session_last_writer_wins() {
        let svc = Arc::new(service().await);
        svc.register("u@x.com", "pw1").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.create_session("u@x.com").await.unwrap().unwrap()
            }));
        }

        let mut issued = Vec::new();
        for handle in handles {
            issued.push(handle.await.unwrap());
        }

        let mut live = Vec::new();
        for sid in &issued {
            if svc.resolve_session(Some(sid)).await.unwrap().is_some() {
                live.push(sid.clone());
            }
        }
        assert_eq!(live.len(), 1, "issued: {issued:?}");

        let stored = svc.repo().get_by_email("u@x.com").await.unwrap().unwrap();
        assert_eq!(stored.session_id.as_deref(), Some(live[0].as_str()));
    }

    #[tokio::test]
    async fn test_session_edge_cases() {
        let svc = service().await;
        assert!(svc.create_session("nobody@x.com").await.unwrap().is_none());
        assert!(svc.resolve_session(None).await.unwrap().is_none());
        assert!(svc.resolve_session(Some("")).await.unwrap().is_none());
        svc.destroy_session(42).await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_password_flow() {
        let svc = service().await;
        svc.register("u@x.com", "pw1").await.unwrap();

        let token = svc.issue_reset_token("u@x.com").await.unwrap();
        svc.redeem_reset_token(&token, "pw2").await.unwrap();

        assert!(svc.valid_login("u@x.com", "pw2").await.unwrap());
        assert!(!svc.valid_login("u@x.com", "pw1").await.unwrap());

        let reused = svc.redeem_reset_token(&token, "pw3").await;
        assert!(matches!(reused, Err(GateError::NotFound(_))));
        assert!(svc.valid_login("u@x.com", "pw2").await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_unknown_inputs() {
        let svc = service().await;

        let result = svc.issue_reset_token("nobody@x.com").await;
        assert!(matches!(result, Err(GateError::NotFound(_))));

        let result = svc.redeem_reset_token("bogus", "pw").await;
        assert!(matches!(result, Err(GateError::NotFound(_))));

        let result = svc.redeem_reset_token("", "pw").await;
        assert!(matches!(result, Err(GateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_token() {
        let svc = service().await;
        svc.register("u@x.com", "pw1").await.unwrap();

        let first = svc.issue_reset_token("u@x.com").await.unwrap();
        let second = svc.issue_reset_token("u@x.com").await.unwrap();

        assert!(svc.redeem_reset_token(&first, "pw2").await.is_err());
        svc.redeem_reset_token(&second, "pw2").await.unwrap();
    }
}
