//! The parse operation: one model call, then block extraction.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::history::{HistoryError, HistoryStore, ParseResult};
use crate::providers::{CompletionRequest, LlmProvider, ProviderError};

use super::extract::extract_blocks;
use super::prompt::SYSTEM_INSTRUCTION;
use super::OrderBlock;

/// Parse failures.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input was blank after trimming; no call was made.
    #[error("nothing to parse: input is empty")]
    EmptyInput,
    /// The model call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The reply contained no recognisable block.
    #[error("could not parse the order; check the input format")]
    NoBlocks,
    /// The result could not be recorded.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Sends orders to a provider and extracts the returned blocks.
#[derive(Clone)]
pub struct OrderParser {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl std::fmt::Debug for OrderParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderParser")
            .field("model", &self.provider.model_id())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OrderParser {
    /// Create a parser at temperature zero.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    /// Override the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the reply length.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Interpret a pasted order.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` for blank input, `Provider` when the call fails
    /// and `NoBlocks` when the reply holds nothing extractable.
    pub async fn parse_order(&self, input: &str) -> Result<Vec<OrderBlock>, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let request = CompletionRequest {
            system: Some(SYSTEM_INSTRUCTION.to_owned()),
            input: input.to_owned(),
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
        };

        debug!(model = self.provider.model_id(), chars = input.len(), "sending order");
        let response = self.provider.complete(request).await?;
        debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "reply received"
        );

        let blocks = extract_blocks(&response.text);
        if blocks.is_empty() {
            warn!(reply_chars = response.text.len(), "no blocks in reply");
            return Err(ParseError::NoBlocks);
        }
        Ok(blocks)
    }

    /// Parse an order and record it as the newest history entry.
    ///
    /// History is left untouched when parsing fails.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] from [`OrderParser::parse_order`], or `History`
    /// when the entry cannot be saved.
    pub async fn parse_into(
        &self,
        history: &mut HistoryStore,
        input: &str,
    ) -> Result<ParseResult, ParseError> {
        let blocks = self.parse_order(input).await?;
        let result = ParseResult::new(input.trim(), blocks);
        history.push_front(result.clone())?;
        info!(id = %result.id, blocks = result.blocks.len(), "order parsed");
        Ok(result)
    }
}
