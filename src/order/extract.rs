//! Recovery of [`OrderBlock`]s from a model reply.
//!
//! The model is told to wrap every row in a code fence and to put the
//! validation line directly below the closing fence. Replies that ignore the
//! fencing still get one best-effort block from their first two lines.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::OrderBlock;

const FENCE: &str = "```";

/// Fence, optional language tag, lazily matched body, closing fence, then the
/// rest of the following line.
const BLOCK_PATTERN: &str = r"```(?:\w+)?\n([\s\S]*?)\n```\n?([^\n]*)";

static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BLOCK_PATTERN).expect("BLOCK_PATTERN is a valid regex"));

/// Extract every fenced row and its validation line from `text`.
///
/// Rows are trimmed of surrounding whitespace other than tabs; validation
/// lines are fully trimmed. Blocks come back in order of appearance.
///
/// When no fenced block is present and the text has at least two non-blank
/// lines, a single block is built from the first line (fence markers
/// stripped) and the second line. Anything else yields an empty list.
pub fn extract_blocks(text: &str) -> Vec<OrderBlock> {
    let normalized = text.replace("\r\n", "\n");

    let mut blocks: Vec<OrderBlock> = BLOCK_RE
        .captures_iter(&normalized)
        .map(|caps| {
            let body = caps.get(1).map_or("", |m| m.as_str());
            let validation = caps.get(2).map_or("", |m| m.as_str());
            OrderBlock::new(trim_row(body), validation.trim())
        })
        .collect();

    if blocks.is_empty() && !normalized.trim().is_empty() {
        if let Some(block) = fallback_block(&normalized) {
            debug!("no fenced block in reply, using line fallback");
            blocks.push(block);
        }
    }

    blocks
}

fn fallback_block(text: &str) -> Option<OrderBlock> {
    let mut lines = text.split('\n').filter(|l| !l.trim().is_empty());
    let first = lines.next()?;
    let second = lines.next()?;
    Some(OrderBlock::new(
        trim_row(&first.replace(FENCE, "")),
        second.trim(),
    ))
}

/// Trim surrounding whitespace but keep tabs: leading and trailing tabs are
/// the empty A, B, C and trailing columns of the row.
fn trim_row(row: &str) -> &str {
    row.trim_matches(|c: char| c.is_whitespace() && c != '\t')
}
