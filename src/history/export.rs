//! CSV export of history rows.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDate};
use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::order::Column;

use super::ParseResult;

/// Local-time format used for the `Time` column.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Export errors.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// There is nothing to export.
    #[error("no history to export")]
    Empty,
    /// Writing a CSV record failed.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    /// Creating or flushing the output failed.
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Header row: `Time` followed by the named sheet columns.
pub fn csv_header() -> Vec<&'static str> {
    std::iter::once("Time")
        .chain(Column::ALL.iter().map(|c| c.export_header()))
        .collect()
}

/// Write one CSV record per block of every result, in history order.
///
/// Returns the number of data records written.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] when `results` is empty, or a write error.
pub fn write_csv<W: Write>(results: &[ParseResult], writer: W) -> Result<usize, ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);
    csv.write_record(csv_header())?;

    for result in results {
        let time = result
            .timestamp
            .with_timezone(&Local)
            .format(TIME_FORMAT)
            .to_string();
        for block in &result.blocks {
            let row = block.row();
            let record = std::iter::once(time.as_str())
                .chain(Column::ALL.iter().map(|&c| row.get(c)));
            csv.write_record(record)?;
        }
    }
    csv.flush()?;

    Ok(results.iter().map(|r| r.blocks.len()).sum())
}

/// Export to a file, creating or truncating it.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] before touching the filesystem when there
/// is nothing to export, or a write error.
pub fn export_to_file(results: &[ParseResult], path: &Path) -> Result<usize, ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }
    let file = File::create(path)?;
    let rows = write_csv(results, file)?;
    info!(path = %path.display(), rows, "exported history to CSV");
    Ok(rows)
}

/// `etsy_orders_YYYY-MM-DD.csv` for the given date.
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("etsy_orders_{}.csv", date.format("%Y-%m-%d"))
}
