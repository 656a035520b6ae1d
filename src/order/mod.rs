//! Order interpretation: prompt, model call, and block extraction.
//!
//! A pasted order goes through [`parser::OrderParser`], which sends it to an
//! [`LlmProvider`](crate::providers::LlmProvider) along with the
//! [`prompt::SYSTEM_INSTRUCTION`] and hands the raw reply to
//! [`extract::extract_blocks`]. Each recovered [`OrderBlock`] carries one
//! 13-column sheet row, modelled by [`row::ShippingRow`].

use serde::{Deserialize, Serialize};

pub mod extract;
pub mod parser;
pub mod prompt;
pub mod row;

pub use extract::extract_blocks;
pub use parser::{OrderParser, ParseError};
pub use row::{Column, ShippingRow, ValidationStatus};

/// One output block: a tab-separated sheet row and its USPS validation line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBlock {
    /// The 13-column tab-separated row, trimmed.
    pub tab_data: String,
    /// The validation line that followed the row, trimmed.
    pub validation: String,
}

impl OrderBlock {
    /// Create a block from a row and a validation line.
    pub fn new(tab_data: impl Into<String>, validation: impl Into<String>) -> Self {
        Self {
            tab_data: tab_data.into(),
            validation: validation.into(),
        }
    }

    /// Split the row into its sheet columns.
    pub fn row(&self) -> ShippingRow {
        ShippingRow::from_tab_data(&self.tab_data)
    }

    /// Classify the validation line.
    pub fn status(&self) -> ValidationStatus {
        ValidationStatus::classify(&self.validation)
    }
}

/// The row of a single block, as pasted into a sheet.
pub fn copy_text(block: &OrderBlock) -> &str {
    &block.tab_data
}

/// Join the rows of several blocks, one per line, for pasting into a sheet.
pub fn copy_all_text(blocks: &[OrderBlock]) -> String {
    blocks
        .iter()
        .map(copy_text)
        .collect::<Vec<_>>()
        .join("\n")
}
