//! Provider selection from a `<provider>/<model>` spec.

use std::sync::Arc;

use tracing::debug;

use crate::config::ModelConfig;
use crate::credentials::{Credentials, GEMINI_API_KEY, OPENAI_API_KEY};

use super::gemini::GeminiProvider;
use super::openai::OpenAiProvider;
use super::{parse_model_spec, LlmProvider};

/// Provider selection errors.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Model spec is not in `<provider>/<model>` format.
    #[error("invalid model spec '{spec}', expected '<provider>/<model>'")]
    InvalidModelSpec {
        /// Invalid raw spec.
        spec: String,
    },
    /// Unsupported provider type in spec prefix.
    #[error("unsupported provider '{provider}' (expected 'gemini' or 'openai')")]
    UnsupportedProvider {
        /// Unsupported provider prefix.
        provider: String,
    },
    /// Required API credential missing for selected provider.
    #[error("missing credential for provider '{provider}': set {key}")]
    MissingCredential {
        /// Provider name.
        provider: String,
        /// Missing credential key.
        key: String,
    },
}

/// Instantiate the provider named by `model.spec`.
///
/// # Errors
///
/// Returns [`RouterError`] when the spec is malformed, names an unknown
/// provider, or the provider's API key is missing.
pub fn build_provider(
    model: &ModelConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn LlmProvider>, RouterError> {
    let spec = model.spec.as_str();
    let (provider, model_name) =
        parse_model_spec(spec).map_err(|_| RouterError::InvalidModelSpec {
            spec: spec.to_owned(),
        })?;

    debug!(provider, model = model_name, "building provider");

    match provider {
        "gemini" | "google" => {
            let key = credentials
                .gemini_api_key()
                .ok_or_else(|| RouterError::MissingCredential {
                    provider: provider.to_owned(),
                    key: GEMINI_API_KEY.to_owned(),
                })?;
            let mut instance =
                GeminiProvider::new(spec.to_owned(), model_name.to_owned(), key);
            if let Some(base_url) = &model.base_url {
                instance = instance.with_base_url(base_url.clone());
            }
            Ok(Arc::new(instance))
        }
        "openai" => {
            let key = credentials
                .openai_api_key()
                .ok_or_else(|| RouterError::MissingCredential {
                    provider: provider.to_owned(),
                    key: OPENAI_API_KEY.to_owned(),
                })?;
            let mut instance =
                OpenAiProvider::new(spec.to_owned(), model_name.to_owned(), key);
            if let Some(base_url) = &model.base_url {
                instance = instance.with_base_url(base_url.clone());
            }
            Ok(Arc::new(instance))
        }
        other => Err(RouterError::UnsupportedProvider {
            provider: other.to_owned(),
        }),
    }
}
