//! Parse history: a newest-first list of results persisted as one JSON file.
//!
//! The on-disk format is a JSON array of [`ParseResult`] objects with
//! camelCase keys and RFC 3339 timestamps. Every mutation rewrites the whole
//! file through a temporary sibling and a rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::order::OrderBlock;

pub mod export;

/// One successful parse of a pasted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// Random v4 identifier.
    pub id: Uuid,
    /// The trimmed input that was sent to the model.
    pub original_text: String,
    /// Extracted blocks, in reply order. Never empty when first recorded.
    pub blocks: Vec<OrderBlock>,
    /// When the parse completed.
    pub timestamp: DateTime<Utc>,
}

impl ParseResult {
    /// Create a result stamped with a fresh id and the current time.
    pub fn new(original_text: impl Into<String>, blocks: Vec<OrderBlock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_text: original_text.into(),
            blocks,
            timestamp: Utc::now(),
        }
    }
}

/// History errors.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Reading or writing the history file failed.
    #[error("history I/O failed at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The list could not be serialized.
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    /// No entry matches the given id or prefix.
    #[error("no history entry matches '{0}'")]
    NotFound(String),
    /// More than one entry matches the given prefix.
    #[error("history id prefix '{0}' matches more than one entry")]
    Ambiguous(String),
    /// The entry exists but has no block at that position.
    #[error("entry {id} has no block {index} (it has {len})")]
    BlockOutOfRange {
        /// Entry id.
        id: Uuid,
        /// Requested zero-based block index.
        index: usize,
        /// Number of blocks in the entry.
        len: usize,
    },
}

/// File-backed parse history, newest entry first.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<ParseResult>,
}

impl HistoryStore {
    /// Open the history at `path`.
    ///
    /// A missing file is an empty history. An unreadable or corrupt file is
    /// logged and also treated as empty; it is overwritten on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<ParseResult>>(&contents) {
                Ok(entries) => {
                    debug!(path = %path.display(), count = entries.len(), "loaded history");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load history, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read history, starting empty");
                Vec::new()
            }
        };
        Self { path, entries }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, newest first.
    pub fn entries(&self) -> &[ParseResult] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: Uuid) -> Option<&ParseResult> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Resolve a full id or a unique, case-insensitive id prefix. Hyphens are
    /// ignored, so prefixes of either the hyphenated or the simple form work.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when nothing matches and `Ambiguous` when a prefix
    /// matches several entries.
    pub fn resolve_id(&self, query: &str) -> Result<Uuid, HistoryError> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return self
                .get(id)
                .map(|r| r.id)
                .ok_or_else(|| HistoryError::NotFound(query.to_owned()));
        }

        let needle = query.replace('-', "").to_ascii_lowercase();
        if needle.is_empty() {
            return Err(HistoryError::NotFound(query.to_owned()));
        }
        let mut matches = self
            .entries
            .iter()
            .filter(|r| r.id.simple().to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found.id),
            (Some(_), Some(_)) => Err(HistoryError::Ambiguous(query.to_owned())),
            (None, _) => Err(HistoryError::NotFound(query.to_owned())),
        }
    }

    /// Insert a result as the newest entry and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn push_front(&mut self, result: ParseResult) -> Result<(), HistoryError> {
        info!(id = %result.id, blocks = result.blocks.len(), "recording parse result");
        let mut entries = Vec::with_capacity(self.entries.len().saturating_add(1));
        entries.push(result);
        entries.extend(self.entries.iter().cloned());
        self.commit(entries)
    }

    /// Remove an entry. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn delete(&mut self, id: Uuid) -> Result<bool, HistoryError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let entries = self
            .entries
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        self.commit(entries)?;
        Ok(true)
    }

    /// Drop every entry and remove the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        self.entries.clear();
        Ok(())
    }

    /// Replace all blocks of an entry. Returns whether the entry existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn update_blocks(
        &mut self,
        id: Uuid,
        blocks: Vec<OrderBlock>,
    ) -> Result<bool, HistoryError> {
        let mut entries = self.entries.clone();
        let Some(entry) = entries.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        entry.blocks = blocks;
        self.commit(entries)?;
        Ok(true)
    }

    /// Replace the row of one block, keeping its validation line.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `BlockOutOfRange` for bad addresses, or an I/O
    /// error if the file cannot be written.
    pub fn update_row(
        &mut self,
        id: Uuid,
        index: usize,
        tab_data: impl Into<String>,
    ) -> Result<(), HistoryError> {
        let mut entries = self.entries.clone();
        let entry = entries
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
        let len = entry.blocks.len();
        let block = entry
            .blocks
            .get_mut(index)
            .ok_or(HistoryError::BlockOutOfRange { id, index, len })?;
        block.tab_data = tab_data.into();
        self.commit(entries)?;
        debug!(%id, index, "row edited");
        Ok(())
    }

    /// Persist `entries`, then make them current. On failure the in-memory
    /// list is left as it was.
    fn commit(&mut self, entries: Vec<ParseResult>) -> Result<(), HistoryError> {
        self.save(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn save(&self, entries: &[ParseResult]) -> Result<(), HistoryError> {
        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}
