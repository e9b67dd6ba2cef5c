//! Excluded-path matching.
//!
//! Paths and patterns are compared with exactly one trailing slash, so
//! `/api/v1/status` and `/api/v1/status/` are the same route. Patterns use
//! shell glob syntax where `*` also crosses `/`.

use glob::Pattern;
use tracing::warn;

/// Ordered set of glob patterns exempt from authentication.
#[derive(Debug, Clone, Default)]
pub struct ExcludedPaths {
    patterns: Vec<Pattern>,
}

impl ExcludedPaths {
    /// Build the set from raw pattern strings.
    ///
    /// A pattern that is not valid glob syntax is matched literally.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|raw| {
                let normalized = normalize_path(raw.as_ref());
                Pattern::new(&normalized)
                    .or_else(|e| {
                        warn!(pattern = %normalized, error = %e, "Invalid glob, matching literally");
                        Pattern::new(&Pattern::escape(&normalized))
                    })
                    .ok()
            })
            .collect();

        Self { patterns }
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `path` matches any pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.patterns.iter().any(|p| p.matches(&path))
    }
}

/// Collapse trailing slashes to exactly one.
pub fn normalize_path(path: &str) -> String {
    format!("{}/", path.trim_end_matches('/'))
}

/// Whether a request to `path` needs authentication.
///
/// A missing path or an empty pattern set always requires it.
pub fn require_auth(path: Option<&str>, excluded: &ExcludedPaths) -> bool {
    let Some(path) = path else {
        return true;
    };
    if excluded.is_empty() {
        return true;
    }
    !excluded.matches(path)
}
