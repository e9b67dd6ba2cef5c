//! Authentication strategies.
//!
//! A strategy knows how to pull an authentication signal out of a request
//! (an `Authorization` header or a session cookie) and how to turn it into
//! a user. Absence is always `Ok(None)`; `Err` only carries store failures.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::auth::paths::{self, ExcludedPaths};
use crate::auth::password::verify_password;
use crate::auth::session::SessionStore;
use crate::config::AuthKind;
use crate::db::{Database, User, UserRepository};
use crate::Result;

/// Prefix of a Basic `Authorization` header value.
const BASIC_PREFIX: &str = "Basic ";

/// Raw `Authorization` header value, if present and valid UTF-8.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Value of the named cookie, if present.
pub fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
}

/// HTTP Basic authentication against the user store.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    db: Database,
}

impl BasicAuth {
    /// Create a Basic strategy over `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The base64 part of a `Basic <base64>` header value.
    pub fn extract_base64_authorization_header(header: &str) -> Option<&str> {
        header.strip_prefix(BASIC_PREFIX)
    }

    /// Decode the base64 payload into UTF-8 text.
    pub fn decode_base64_authorization_header(encoded: &str) -> Option<String> {
        let bytes = STANDARD.decode(encoded.trim()).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// Split decoded credentials on the first `:` into (email, password).
    pub fn extract_user_credentials(decoded: &str) -> Option<(&str, &str)> {
        decoded.split_once(':')
    }

    /// The user with this email, if the password matches its digest.
    pub async fn user_object_from_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        let Some(user) = UserRepository::new(self.db.pool())
            .get_by_email(email)
            .await?
        else {
            debug!(email = %email, "Basic auth: unknown email");
            return Ok(None);
        };

        if verify_password(password, &user.hashed_password) {
            Ok(Some(user))
        } else {
            warn!(email = %email, "Basic auth: wrong password");
            Ok(None)
        }
    }

    /// Resolve the user named by the request's Basic credentials.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Option<User>> {
        let credentials = authorization_header(headers)
            .and_then(Self::extract_base64_authorization_header)
            .and_then(Self::decode_base64_authorization_header);
        let Some(decoded) = credentials else {
            return Ok(None);
        };
        let Some((email, password)) = Self::extract_user_credentials(&decoded) else {
            debug!("Basic auth: credentials without separator");
            return Ok(None);
        };

        self.user_object_from_credentials(email, password).await
    }
}

/// Session-cookie authentication over a [`SessionStore`].
#[derive(Debug)]
pub struct SessionAuth {
    db: Database,
    cookie_name: String,
    store: SessionStore,
}

impl SessionAuth {
    /// Session strategy with a process-lifetime store.
    pub fn in_memory(db: Database, cookie_name: impl Into<String>) -> Self {
        Self {
            db,
            cookie_name: cookie_name.into(),
            store: SessionStore::memory(),
        }
    }

    /// Session strategy with sessions persisted to the database.
    pub fn persisted(db: Database, cookie_name: impl Into<String>) -> Self {
        Self {
            store: SessionStore::persisted(db.clone()),
            db,
            cookie_name: cookie_name.into(),
        }
    }

    /// Name of the cookie carrying the session id.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// The underlying session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Session id carried by the request, if any.
    pub fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        session_cookie(headers, &self.cookie_name)
    }

    /// Start a session for an existing user.
    ///
    /// Returns None when the user id does not name a stored user.
    pub async fn create_session(&self, user_id: i64) -> Result<Option<String>> {
        if user_id <= 0 {
            return Ok(None);
        }
        if UserRepository::new(self.db.pool())
            .get_by_id(user_id)
            .await?
            .is_none()
        {
            return Ok(None);
        }
        self.store.create(user_id).await
    }

    /// User id owning `session_id`.
    pub async fn user_id_for_session_id(&self, session_id: &str) -> Result<Option<i64>> {
        self.store.lookup(session_id).await
    }

    /// Resolve the user behind the request's session cookie.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Option<User>> {
        let Some(session_id) = self.session_cookie(headers) else {
            return Ok(None);
        };
        let Some(user_id) = self.user_id_for_session_id(&session_id).await? else {
            return Ok(None);
        };
        UserRepository::new(self.db.pool()).get_by_id(user_id).await
    }

    /// Destroy the session named by the request's cookie.
    ///
    /// Returns false if there is no cookie or no such session.
    pub async fn destroy_session(&self, headers: &HeaderMap) -> Result<bool> {
        let Some(session_id) = self.session_cookie(headers) else {
            return Ok(false);
        };
        let destroyed = self.store.destroy(&session_id).await?;
        if destroyed {
            debug!("Session destroyed");
        }
        Ok(destroyed)
    }
}

/// The configured authentication strategy.
#[derive(Debug)]
pub enum AuthStrategy {
    /// Never resolves a user; the gate only checks for an `Authorization` header.
    NoAuth,
    /// HTTP Basic credentials.
    Basic(BasicAuth),
    /// Session cookie, in-memory or persisted.
    Session(SessionAuth),
}

impl AuthStrategy {
    /// Build the strategy selected by `kind`. `AuthKind::Disabled` yields None.
    pub fn from_kind(kind: AuthKind, db: &Database, cookie_name: &str) -> Option<Self> {
        match kind {
            AuthKind::Disabled => None,
            AuthKind::NoAuth => Some(AuthStrategy::NoAuth),
            AuthKind::Basic => Some(AuthStrategy::Basic(BasicAuth::new(db.clone()))),
            AuthKind::Session => Some(AuthStrategy::Session(SessionAuth::in_memory(
                db.clone(),
                cookie_name,
            ))),
            AuthKind::SessionDb => Some(AuthStrategy::Session(SessionAuth::persisted(
                db.clone(),
                cookie_name,
            ))),
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> AuthKind {
        match self {
            AuthStrategy::NoAuth => AuthKind::NoAuth,
            AuthStrategy::Basic(_) => AuthKind::Basic,
            AuthStrategy::Session(session) if session.store().is_persisted() => {
                AuthKind::SessionDb
            }
            AuthStrategy::Session(_) => AuthKind::Session,
        }
    }

    /// Whether `path` needs authentication given the excluded patterns.
    pub fn require_auth(&self, path: Option<&str>, excluded: &ExcludedPaths) -> bool {
        paths::require_auth(path, excluded)
    }

    /// The credential or session signal carried by the request.
    pub fn extract_auth_signal(&self, headers: &HeaderMap) -> Option<String> {
        match self {
            AuthStrategy::NoAuth | AuthStrategy::Basic(_) => {
                authorization_header(headers).map(str::to_string)
            }
            AuthStrategy::Session(session) => session.session_cookie(headers),
        }
    }

    /// Resolve the identity behind the request.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Option<User>> {
        match self {
            AuthStrategy::NoAuth => Ok(None),
            AuthStrategy::Basic(basic) => basic.current_user(headers).await,
            AuthStrategy::Session(session) => session.current_user(headers).await,
        }
    }

    /// The session strategy, if this is one.
    pub fn as_session(&self) -> Option<&SessionAuth> {
        match self {
            AuthStrategy::Session(session) => Some(session),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::NewUser;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;

    async fn setup_db() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        let digest = hash_password("secret").unwrap();
        UserRepository::new(db.pool())
            .create(&NewUser::new("e@x.com", digest))
            .await
            .unwrap();
        db
    }

    fn basic_headers(credentials: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", STANDARD.encode(credentials));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    fn cookie_headers(name: &str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{name}={value}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_extract_base64_authorization_header() {
        assert_eq!(
            BasicAuth::extract_base64_authorization_header("Basic SG9sYmVydG9u"),
            Some("SG9sYmVydG9u")
        );
        assert_eq!(BasicAuth::extract_base64_authorization_header("Bearer x"), None);
        assert_eq!(BasicAuth::extract_base64_authorization_header("Basic"), None);
    }

    #[test]
    fn test_decode_base64_authorization_header() {
        assert_eq!(
            BasicAuth::decode_base64_authorization_header("SG9sYmVydG9u").as_deref(),
            Some("Holberton")
        );
        assert_eq!(BasicAuth::decode_base64_authorization_header("not base64!"), None);
        // Valid base64, invalid UTF-8.
        assert_eq!(BasicAuth::decode_base64_authorization_header("/w=="), None);
    }

    #[test]
    fn test_extract_user_credentials() {
        assert_eq!(
            BasicAuth::extract_user_credentials("e@x.com:secret"),
            Some(("e@x.com", "secret"))
        );
        assert_eq!(
            BasicAuth::extract_user_credentials("e@x.com:pa:ss"),
            Some(("e@x.com", "pa:ss"))
        );
        assert_eq!(BasicAuth::extract_user_credentials("e@x.com"), None);
    }

    #[tokio::test]
    async fn test_basic_current_user() {
        let basic = BasicAuth::new(setup_db().await);

        let user = basic
            .current_user(&basic_headers("e@x.com:secret"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.email, "e@x.com");
    }

    #[tokio::test]
    async fn test_basic_rejections() {
        let basic = BasicAuth::new(setup_db().await);

        for credentials in ["e@x.com", "e@x.com:wrong", "nobody@x.com:secret"] {
            let user = basic.current_user(&basic_headers(credentials)).await.unwrap();
            assert!(user.is_none(), "{credentials}");
        }

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic %%%"));
        assert!(basic.current_user(&headers).await.unwrap().is_none());
        assert!(basic.current_user(&HeaderMap::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let session = SessionAuth::in_memory(setup_db().await, "_my_session_id");

        let sid = session.create_session(1).await.unwrap().unwrap();
        let headers = cookie_headers("_my_session_id", &sid);

        let user = session.current_user(&headers).await.unwrap().unwrap();
        assert_eq!(user.id, 1);

        assert!(session.destroy_session(&headers).await.unwrap());
        assert!(session.current_user(&headers).await.unwrap().is_none());
        assert!(!session.destroy_session(&headers).await.unwrap());
    }

    #[tokio::test]
    async fn test_session_create_unknown_user() {
        let session = SessionAuth::in_memory(setup_db().await, "_my_session_id");
        assert!(session.create_session(99).await.unwrap().is_none());
        assert!(session.create_session(0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_wrong_cookie_name() {
        let session = SessionAuth::in_memory(setup_db().await, "_my_session_id");
        let sid = session.create_session(1).await.unwrap().unwrap();

        let headers = cookie_headers("other", &sid);
        assert!(session.current_user(&headers).await.unwrap().is_none());
        assert!(!session.destroy_session(&headers).await.unwrap());
        assert!(!session.destroy_session(&HeaderMap::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_persisted_session_lifecycle() {
        let session = SessionAuth::persisted(setup_db().await, "sid");

        let sid = session.create_session(1).await.unwrap().unwrap();
        let headers = cookie_headers("sid", &sid);
        assert_eq!(session.current_user(&headers).await.unwrap().unwrap().id, 1);

        assert!(session.destroy_session(&headers).await.unwrap());
        assert!(session.current_user(&headers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_strategy_kinds() {
        let db = setup_db().await;

        assert!(AuthStrategy::from_kind(AuthKind::Disabled, &db, "sid").is_none());
        for kind in [
            AuthKind::NoAuth,
            AuthKind::Basic,
            AuthKind::Session,
            AuthKind::SessionDb,
        ] {
            let strategy = AuthStrategy::from_kind(kind, &db, "sid").unwrap();
            assert_eq!(strategy.kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_extract_auth_signal() {
        let db = setup_db().await;
        let basic = AuthStrategy::from_kind(AuthKind::Basic, &db, "sid").unwrap();
        let session = AuthStrategy::from_kind(AuthKind::Session, &db, "sid").unwrap();

        let headers = basic_headers("e@x.com:secret");
        assert!(basic.extract_auth_signal(&headers).is_some());
        assert!(session.extract_auth_signal(&headers).is_none());

        let cookies = cookie_headers("sid", "abc");
        assert_eq!(session.extract_auth_signal(&cookies).as_deref(), Some("abc"));
        assert!(basic.extract_auth_signal(&cookies).is_none());
    }

    #[tokio::test]
    async fn test_no_auth_never_resolves() {
        let strategy = AuthStrategy::NoAuth;
        let headers = basic_headers("e@x.com:secret");
        assert!(strategy.extract_auth_signal(&headers).is_some());
        assert!(strategy.current_user(&headers).await.unwrap().is_none());
        assert!(strategy.as_session().is_none());
    }

    #[tokio::test]
    async fn test_excluded_path_regardless_of_strategy() {
        let db = setup_db().await;
        let excluded = ExcludedPaths::new(["/api/v1/status/"]);
        for kind in [AuthKind::NoAuth, AuthKind::Basic, AuthKind::Session] {
            let strategy = AuthStrategy::from_kind(kind, &db, "sid").unwrap();
            assert!(!strategy.require_auth(Some("/api/v1/status/"), &excluded));
            assert!(strategy.require_auth(Some("/api/v1/users"), &excluded));
        }
    }
}
