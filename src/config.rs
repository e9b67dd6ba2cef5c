//! Configuration module for sessiongate.

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use crate::{GateError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Socket address built from host and port.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| GateError::Config(format!("invalid server address: {e}")))
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/sessiongate.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Which authentication strategy guards the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AuthKind {
    /// No strategy configured; every request is allowed through.
    #[default]
    #[serde(rename = "none")]
    Disabled,
    /// Base strategy that never resolves a user.
    #[serde(rename = "auth")]
    NoAuth,
    /// HTTP Basic credentials checked against the user store.
    #[serde(rename = "basic_auth", alias = "basic")]
    Basic,
    /// Session cookie resolved through an in-memory store.
    #[serde(rename = "session_auth", alias = "session")]
    Session,
    /// Session cookie resolved through persisted session records.
    #[serde(rename = "session_db_auth", alias = "session_db")]
    SessionDb,
}

impl AuthKind {
    /// Configuration name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::Disabled => "none",
            AuthKind::NoAuth => "auth",
            AuthKind::Basic => "basic_auth",
            AuthKind::Session => "session_auth",
            AuthKind::SessionDb => "session_db_auth",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthKind {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(AuthKind::Disabled),
            "auth" => Ok(AuthKind::NoAuth),
            "basic" | "basic_auth" => Ok(AuthKind::Basic),
            "session" | "session_auth" => Ok(AuthKind::Session),
            "session_db" | "session_db_auth" => Ok(AuthKind::SessionDb),
            other => Err(GateError::Config(format!("unknown auth type: {other}"))),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Strategy guarding the `/api/v1` routes.
    #[serde(default, rename = "type")]
    pub kind: AuthKind,
    /// Cookie carrying the session id for session strategies.
    #[serde(default = "default_session_name")]
    pub session_name: String,
    /// Cookie carrying the session id stored on the user record.
    #[serde(default = "default_user_session_cookie")]
    pub user_session_cookie: String,
    /// Glob patterns exempt from authentication.
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

fn default_session_name() -> String {
    "_my_session_id".to_string()
}

fn default_user_session_cookie() -> String {
    "session_id".to_string()
}

fn default_excluded_paths() -> Vec<String> {
    vec![
        "/api/v1/status/".to_string(),
        "/api/v1/unauthorized/".to_string(),
        "/api/v1/forbidden/".to_string(),
        "/api/v1/auth_session/login/".to_string(),
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            kind: AuthKind::default(),
            session_name: default_session_name(),
            user_session_cookie: default_user_session_cookie(),
            excluded_paths: default_excluded_paths(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/sessiongate.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web layer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins. Empty means any origin without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web layer configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GateError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GateError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `AUTH_TYPE`: strategy selector
    /// - `SESSION_NAME`: session cookie name
    /// - `API_HOST` / `API_PORT`: bind address
    /// - `DATABASE_PATH`: SQLite database file
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(kind) = get("AUTH_TYPE") {
            self.auth.kind = kind.parse()?;
        }
        if let Some(name) = get("SESSION_NAME") {
            self.auth.session_name = name;
        }
        if let Some(host) = get("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("API_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| GateError::Config(format!("invalid API_PORT: {port}")))?;
        }
        if let Some(path) = get("DATABASE_PATH") {
            self.database.path = path;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.session_name.trim().is_empty() {
            return Err(GateError::Config("session_name must not be empty".to_string()));
        }
        if self.auth.user_session_cookie.trim().is_empty() {
            return Err(GateError::Config(
                "user_session_cookie must not be empty".to_string(),
            ));
        }
        self.server.socket_addr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.path, "data/sessiongate.db");
        assert_eq!(config.auth.kind, AuthKind::Disabled);
        assert_eq!(config.auth.session_name, "_my_session_id");
        assert_eq!(config.auth.user_session_cookie, "session_id");
        assert!(config
            .auth
            .excluded_paths
            .contains(&"/api/v1/status/".to_string()));
        assert_eq!(config.logging.level, "info");
        assert!(config.web.cors_origins.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
path = "/tmp/gate.db"

[auth]
type = "session_db_auth"
session_name = "sid"
user_session_cookie = "user_sid"
excluded_paths = ["/api/v1/status/", "/api/v1/stat*"]

[logging]
level = "debug"
file = "/tmp/gate.log"

[web]
cors_origins = ["http://localhost:3000"]
"#;
        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "/tmp/gate.db");
        assert_eq!(config.auth.kind, AuthKind::SessionDb);
        assert_eq!(config.auth.session_name, "sid");
        assert_eq!(config.auth.user_session_cookie, "user_sid");
        assert_eq!(config.auth.excluded_paths.len(), 2);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.web.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_parse_short_auth_alias() {
        let config = Config::parse("[auth]\ntype = \"basic\"\n").unwrap();
        assert_eq!(config.auth.kind, AuthKind::Basic);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.kind, AuthKind::Disabled);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[server]\nport = \"not a number\"\n");
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("/nonexistent/sessiongate.toml");
        assert!(matches!(result, Err(GateError::Io(_))));
    }

    #[test]
    fn test_auth_kind_from_str() {
        assert_eq!("none".parse::<AuthKind>().unwrap(), AuthKind::Disabled);
        assert_eq!("auth".parse::<AuthKind>().unwrap(), AuthKind::NoAuth);
        assert_eq!("basic_auth".parse::<AuthKind>().unwrap(), AuthKind::Basic);
        assert_eq!("SESSION".parse::<AuthKind>().unwrap(), AuthKind::Session);
        assert_eq!(
            "session_db_auth".parse::<AuthKind>().unwrap(),
            AuthKind::SessionDb
        );
        assert!("oauth".parse::<AuthKind>().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("AUTH_TYPE", "session_auth"),
                ("SESSION_NAME", "custom_sid"),
                ("API_HOST", "127.0.0.1"),
                ("API_PORT", "9000"),
                ("DATABASE_PATH", "/tmp/override.db"),
            ]))
            .unwrap();

        assert_eq!(config.auth.kind, AuthKind::Session);
        assert_eq!(config.auth.session_name, "custom_sid");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, "/tmp/override.db");
    }

    #[test]
    fn test_apply_overrides_empty_value_ignored() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[("SESSION_NAME", ""), ("AUTH_TYPE", "")]))
            .unwrap();

        assert_eq!(config.auth.session_name, "_my_session_id");
        assert_eq!(config.auth.kind, AuthKind::Disabled);
    }

    #[test]
    fn test_apply_overrides_invalid_port() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup(&[("API_PORT", "eighty")]));
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_validate_empty_session_name() {
        let mut config = Config::default();
        config.auth.session_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }
}
