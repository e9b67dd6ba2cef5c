//! Logging setup.
//!
//! Log records never carry personal data verbatim: the fields named in
//! [`PII_FIELDS`] are written as [`REDACTION`] whatever their value, so
//! `info!(email = %email, ..)` is safe at any call site.

use std::fmt;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::field::Field;
use tracing::Level;
use tracing_subscriber::field::MakeExt;
use tracing_subscriber::fmt::format::{self, FormatFields, Writer};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Field names whose values are never written to the log.
pub const PII_FIELDS: &[&str] = &["name", "email", "phone", "ssn", "password"];

/// Replacement written for a redacted value.
pub const REDACTION: &str = "***";

/// Whether values recorded under `field` are personal data.
pub fn is_pii(field: &str) -> bool {
    PII_FIELDS.contains(&field)
}

/// Field formatter writing `key=value` pairs with [`PII_FIELDS`] redacted.
pub fn redacting_fields() -> impl for<'writer> FormatFields<'writer> + Send + Sync + 'static {
    format::debug_fn(|writer: &mut Writer<'_>, field: &Field, value: &dyn fmt::Debug| {
        match field.name() {
            "message" => write!(writer, "{value:?}"),
            name if is_pii(name) => write!(writer, "{name}={REDACTION}"),
            name => write!(writer, "{name}={value:?}"),
        }
    })
    .delimited(" ")
}

fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `RUST_LOG` directives on top of the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(parse_level(level).into())
}

/// Log to stdout and to `config.file`, creating its directory if needed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let path = Path::new(&config.file);
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let log_file = Arc::new(File::create(path)?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .fmt_fields(redacting_fields())
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(env_filter(&config.level))
        .init();

    Ok(())
}

/// Log to stdout only. Used when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .fmt_fields(redacting_fields())
                .with_writer(std::io::stdout)
                .with_target(true),
        )
        .with(env_filter(level))
        .init();
}
