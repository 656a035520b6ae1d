//! Order Parser CLI entry point.
//!
//! Parses pasted orders through the configured model and manages the local
//! history: listing, showing, copying, editing, deleting and CSV export.
//! Rows go to stdout; logs go to stderr.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::debug;

use order_parser::config::Config;
use order_parser::credentials::load_credentials;
use order_parser::history::export::{default_export_filename, export_to_file, TIME_FORMAT};
use order_parser::history::{HistoryStore, ParseResult};
use order_parser::logging;
use order_parser::order::{copy_all_text, copy_text, OrderBlock, OrderParser};
use order_parser::providers::router::build_provider;

/// Order Parser: turn pasted shipping orders into 13-column sheet rows.
#[derive(Parser)]
#[command(name = "order-parser", version, about)]
struct Cli {
    /// Config file (default: `$ORDER_PARSER_CONFIG` or `~/.order-parser/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History file, overriding the configured one.
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Parse an order from TEXT, --file, or stdin and record it.
    Parse {
        /// Order text. Read from stdin when neither TEXT nor --file is given.
        text: Option<String>,
        /// Read the order from a file.
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// List recorded parses, newest first.
    History,
    /// Show one entry's input and blocks.
    Show {
        /// Entry id or unique prefix.
        id: String,
    },
    /// Print raw rows for pasting into a sheet.
    Copy {
        /// Entry id or unique prefix.
        id: String,
        /// Only this block (1-based).
        #[arg(long)]
        index: Option<usize>,
    },
    /// Replace the row of one block. `\t` in ROW is read as a tab.
    Edit {
        /// Entry id or unique prefix.
        id: String,
        /// Block number (1-based).
        index: usize,
        /// New tab-separated row.
        row: String,
    },
    /// Delete one entry.
    Delete {
        /// Entry id or unique prefix.
        id: String,
    },
    /// Delete every entry.
    Clear {
        /// Confirm deletion of the whole history.
        #[arg(long)]
        yes: bool,
    },
    /// Export all rows to CSV.
    Export {
        /// Output file (default: `etsy_orders_YYYY-MM-DD.csv`).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let _logging_guard = match &config.logging.dir {
        Some(dir) => Some(logging::init_with_file(dir, &config.logging.level)?),
        None => {
            logging::init_cli(&config.logging.level)?;
            None
        }
    };

    let history_path = match cli.history {
        Some(path) => path,
        None => config.history_path()?,
    };
    debug!(path = %history_path.display(), "opening history");
    let mut history = HistoryStore::open(history_path);

    match cli.command {
        Command::Parse { text, file } => handle_parse(&config, &mut history, text, file).await,
        Command::History => {
            handle_history(&history);
            Ok(())
        }
        Command::Show { id } => handle_show(&history, &id),
        Command::Copy { id, index } => handle_copy(&history, &id, index),
        Command::Edit { id, index, row } => handle_edit(&mut history, &id, index, &row),
        Command::Delete { id } => handle_delete(&mut history, &id),
        Command::Clear { yes } => handle_clear(&mut history, yes),
        Command::Export { output } => handle_export(&history, output),
    }
}

/// Read the order, run one model call and record the result.
async fn handle_parse(
    config: &Config,
    history: &mut HistoryStore,
    text: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read order from stdin")?;
            buf
        }
    };

    if input.trim().is_empty() {
        anyhow::bail!("nothing to parse: input is empty");
    }

    let credentials = load_credentials(config.env_file().as_deref())?;
    let provider =
        build_provider(&config.model, &credentials).context("failed to set up model provider")?;
    let parser = OrderParser::new(provider)
        .with_temperature(config.model.temperature)
        .with_max_tokens(config.model.max_tokens);

    let result = parser.parse_into(history, &input).await?;
    print_blocks(&result.blocks);
    println!("saved as {}", result.id);
    Ok(())
}

fn handle_history(history: &HistoryStore) {
    if history.is_empty() {
        println!("no history yet");
        return;
    }
    for result in history.entries() {
        let statuses = result
            .blocks
            .iter()
            .map(|b| b.status().to_string())
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{}  {}  {} block(s)  [{}]",
            short_id(result),
            local_time(result),
            result.blocks.len(),
            statuses
        );
    }
}

fn handle_show(history: &HistoryStore, query: &str) -> anyhow::Result<()> {
    let result = lookup(history, query)?;
    println!("id:   {}", result.id);
    println!("time: {}", local_time(result));
    println!("--- input ---");
    println!("{}", result.original_text);
    println!("--- blocks ---");
    print_blocks(&result.blocks);
    Ok(())
}

fn handle_copy(history: &HistoryStore, query: &str, index: Option<usize>) -> anyhow::Result<()> {
    let result = lookup(history, query)?;
    match index {
        Some(n) => {
            let block = n
                .checked_sub(1)
                .and_then(|i| result.blocks.get(i))
                .ok_or_else(|| {
                    anyhow::anyhow!("entry has {} block(s), no block {n}", result.blocks.len())
                })?;
            println!("{}", copy_text(block));
        }
        None => println!("{}", copy_all_text(&result.blocks)),
    }
    Ok(())
}

fn handle_edit(
    history: &mut HistoryStore,
    query: &str,
    index: usize,
    row: &str,
) -> anyhow::Result<()> {
    let id = history.resolve_id(query)?;
    let zero_based = index
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("block numbers start at 1"))?;
    history.update_row(id, zero_based, row.replace("\\t", "\t"))?;
    println!("updated block {index} of {id}");
    Ok(())
}

fn handle_delete(history: &mut HistoryStore, query: &str) -> anyhow::Result<()> {
    let id = history.resolve_id(query)?;
    history.delete(id)?;
    println!("deleted {id}");
    Ok(())
}

fn handle_clear(history: &mut HistoryStore, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!(
            "refusing to delete {} entr(ies) without --yes",
            history.len()
        );
    }
    history.clear()?;
    println!("history cleared");
    Ok(())
}

fn handle_export(history: &HistoryStore, output: Option<PathBuf>) -> anyhow::Result<()> {
    let path = output
        .unwrap_or_else(|| PathBuf::from(default_export_filename(Local::now().date_naive())));
    let rows = export_to_file(history.entries(), &path)
        .with_context(|| format!("failed to export to {}", path.display()))?;
    println!("exported {rows} row(s) to {}", path.display());
    Ok(())
}

fn lookup<'a>(history: &'a HistoryStore, query: &str) -> anyhow::Result<&'a ParseResult> {
    let id = history.resolve_id(query)?;
    history
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("no history entry matches '{query}'"))
}

fn print_blocks(blocks: &[OrderBlock]) {
    for (n, block) in (1_usize..).zip(blocks) {
        let row = block.row();
        println!("[{n}] {}", block.tab_data);
        if !row.is_complete() {
            println!("    (expected 13 columns, found {})", row.column_count());
        }
        println!("    {}", block.validation);
    }
}

fn short_id(result: &ParseResult) -> String {
    result.id.simple().to_string().chars().take(8).collect()
}

fn local_time(result: &ParseResult) -> String {
    result
        .timestamp
        .with_timezone(&Local)
        .format(TIME_FORMAT)
        .to_string()
}
