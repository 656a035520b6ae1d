//! API key loading from the process environment and an optional `.env` file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Generic fallback variable for the Gemini API key.
pub const FALLBACK_API_KEY: &str = "API_KEY";

/// Environment variable holding the OpenAI-compatible API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const KNOWN_KEYS: [&str; 3] = [GEMINI_API_KEY, FALLBACK_API_KEY, OPENAI_API_KEY];

/// An API key whose value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw key, for placing in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Credentials collected from a `.env` file and the process environment.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential value for a key, if present and non-blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Gemini key: `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn gemini_api_key(&self) -> Option<ApiKey> {
        self.get(GEMINI_API_KEY)
            .or_else(|| self.get(FALLBACK_API_KEY))
            .map(ApiKey::new)
    }

    /// OpenAI-compatible key from `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<ApiKey> {
        self.get(OPENAI_API_KEY).map(ApiKey::new)
    }
}

/// Load credentials from an optional `.env` file, then overlay the process
/// environment. Process variables win over file values.
///
/// # Errors
///
/// Returns an error if the `.env` file exists but cannot be parsed.
pub fn load_credentials(env_file: Option<&Path>) -> anyhow::Result<Credentials> {
    load_credentials_with(env_file, |key| std::env::var(key).ok())
}

/// Like [`load_credentials`] with a custom environment resolver (for testing).
///
/// # Errors
///
/// Returns an error if the `.env` file exists but cannot be parsed.
pub fn load_credentials_with(
    env_file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Credentials> {
    let mut vars = BTreeMap::new();

    if let Some(path) = env_file.filter(|p| p.exists()) {
        warn_if_shared(path);
        let iter = dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to read credentials at {}", path.display()))?;
        for item in iter {
            let (key, value) = item.with_context(|| {
                format!(
                    "failed to parse key-value entry in credentials file {}",
                    path.display()
                )
            })?;
            vars.insert(key, value);
        }
        debug!(path = %path.display(), "loaded credentials file");
    }

    for key in KNOWN_KEYS {
        if let Some(value) = env(key) {
            vars.insert(key.to_owned(), value);
        }
    }

    Ok(Credentials { vars })
}

#[cfg(unix)]
fn warn_if_shared(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = std::fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = format!("{mode:o}"),
                "credentials file is readable by other users, consider chmod 600"
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_shared(_path: &Path) {}
