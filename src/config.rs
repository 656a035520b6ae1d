//! Configuration loading.
//!
//! Loads `config.toml` from `$ORDER_PARSER_CONFIG` or
//! `~/.order-parser/config.toml`. A missing file yields defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::providers::gemini::DEFAULT_GEMINI_MODEL;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "ORDER_PARSER_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model selection and sampling.
    pub model: ModelConfig,
    /// Filesystem locations.
    pub paths: PathsConfig,
    /// Log filtering and optional file output.
    pub logging: LoggingConfig,
}

/// Model selection and sampling settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// `<provider>/<model>`, e.g. `gemini/gemini-3-flash-preview`.
    pub spec: String,
    /// Sampling temperature. Zero keeps parsing deterministic.
    pub temperature: f32,
    /// Optional output token cap.
    pub max_tokens: Option<u32>,
    /// Optional API host override.
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            spec: format!("gemini/{DEFAULT_GEMINI_MODEL}"),
            temperature: 0.0,
            max_tokens: None,
            base_url: None,
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// History JSON file. Defaults to `<config dir>/history.json`.
    pub history: Option<PathBuf>,
    /// Credentials `.env` file. Defaults to `<config dir>/.env`.
    pub env_file: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// When set, JSON logs are also written here with daily rotation.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            dir: None,
        }
    }
}

impl Config {
    /// Load configuration with precedence env vars > TOML file > defaults.
    ///
    /// `explicit` (from `--config`) beats `$ORDER_PARSER_CONFIG`, which beats
    /// the default location. An explicitly named file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`] with a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = match env(CONFIG_PATH_ENV) {
                    Some(p) => PathBuf::from(p),
                    None => config_dir()?.join("config.toml"),
                };
                Self::from_file_or_default(&path)?
            }
        };
        config.apply_overrides(env);
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loading config from file");
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    fn from_file_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests avoid mutating the process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("ORDER_PARSER_MODEL") {
            self.model.spec = v;
        }
        if let Some(v) = env("ORDER_PARSER_BASE_URL") {
            self.model.base_url = Some(v);
        }
        if let Some(v) = env("ORDER_PARSER_TEMPERATURE") {
            match v.parse() {
                Ok(t) => self.model.temperature = t,
                Err(_) => tracing::warn!(
                    var = "ORDER_PARSER_TEMPERATURE",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("ORDER_PARSER_HISTORY") {
            self.paths.history = Some(PathBuf::from(v));
        }
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrongly typed values.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }

    /// Resolved history file path.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the home directory is unknown.
    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.paths.history {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join("history.json")),
        }
    }

    /// Resolved credentials `.env` path, if one can be determined.
    pub fn env_file(&self) -> Option<PathBuf> {
        self.paths
            .env_file
            .clone()
            .or_else(|| config_dir().ok().map(|dir| dir.join(".env")))
    }
}

/// Resolve the default config directory (`~/.order-parser/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".order-parser"))
}
