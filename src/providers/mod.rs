//! Language-model provider abstraction layer.
//!
//! Defines the [`LlmProvider`] trait and the shared request/response types.
//! The model is treated as an opaque text-in/text-out collaborator: one
//! system instruction and one user input go in, one text reply comes out.
//!
//! Two providers are implemented:
//! - [`gemini::GeminiProvider`]: Google `models/{model}:generateContent` API
//! - [`openai::OpenAiProvider`]: any OpenAI-compatible `/v1/chat/completions` API
//!
//! [`router::build_provider`] picks one from a `<provider>/<model>` spec.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod gemini;
pub mod openai;
pub mod router;

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction (sent ahead of the input).
    pub system: Option<String>,
    /// The user input text.
    pub input: String,
    /// Sampling temperature; `None` leaves the provider default.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response; `None` leaves the provider default.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Build a request with only user input set.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            system: None,
            input: input.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Usage statistics for a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageStats {
    /// Tokens used in the prompt/input.
    pub input_tokens: u32,
    /// Tokens generated in the response.
    pub output_tokens: u32,
}

/// The response from a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Reply text. Empty when the model returned no text.
    pub text: String,
    /// The model identifier that served this response.
    pub model: String,
    /// Token usage.
    pub usage: UsageStats,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

const SECRET_PATTERN_SOURCES: [&str; 3] = [
    r"AIza[0-9A-Za-z_\-]{20,}",
    r"sk-[A-Za-z0-9_\-]{20,}",
    r"ya29\.[0-9A-Za-z_\-]{20,}",
];

/// Key-like tokens redacted from upstream error bodies, compiled once.
static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SECRET_PATTERN_SOURCES
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

/// Collapse whitespace, redact key-like tokens and cap the length of an
/// upstream error body so it is safe to log and display.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for regex in SECRET_PATTERNS.iter() {
        sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Core provider interface.
///
/// Implementations must be `Send + Sync` so a provider can be shared behind
/// an `Arc` across async tasks.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request a completion from the model. Exactly one upstream call is made.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;

    /// The model spec string this provider is instantiated for.
    fn model_id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Parse a model spec like `"gemini/gemini-3-flash-preview"` into components.
///
/// Returns `(provider_name, model_name)`. Only the first `/` separates the
/// two, so model names may themselves contain slashes.
///
/// # Errors
///
/// Returns an error if there is no `/` or either side is empty.
pub fn parse_model_spec(s: &str) -> anyhow::Result<(&str, &str)> {
    let (provider, model) = s.split_once('/').ok_or_else(|| {
        anyhow::anyhow!("invalid model spec: {s:?}, expected format 'provider/model'")
    })?;
    if provider.is_empty() || model.is_empty() {
        anyhow::bail!("invalid model spec: {s:?}, both provider and model must be non-empty");
    }
    Ok((provider, model))
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
