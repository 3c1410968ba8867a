//! Save command - persist processed (and possibly edited) page results.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::info;

use cheqr_core::models::{NewCheque, PageResult, ProcessingStatus};
use cheqr_core::store::{ChequeStore, SqliteStore};

use super::load_config;

/// Arguments for the save command.
#[derive(Args)]
pub struct SaveArgs {
    /// JSON file holding the page results to persist (as produced by
    /// `cheqr process`, possibly after manual edits)
    #[arg(required = true)]
    input: PathBuf,

    /// Also persist degraded pages that carry no field data
    #[arg(long)]
    include_errors: bool,
}

pub async fn run(args: SaveArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let content = fs::read_to_string(&args.input)?;
    let pages: Vec<PageResult> = serde_json::from_str(&content)?;
    info!(pages = pages.len(), "loaded page results");

    let store = Arc::new(SqliteStore::open(&config.store)?);

    let mut saved = 0usize;
    let mut skipped = 0usize;
    for page in &pages {
        if page.processing_status == ProcessingStatus::Error && !args.include_errors {
            skipped += 1;
            continue;
        }
        let id = store.insert_cheque_and_maybe_party(&NewCheque::from(page))?;
        println!("{} Page {} saved as record {}", style("✓").green(), page.page_number, id);
        saved += 1;
    }

    println!(
        "{} Saved {} record(s){}",
        style("✓").green(),
        saved,
        if skipped > 0 {
            format!(", skipped {skipped} degraded page(s)")
        } else {
            String::new()
        }
    );
    Ok(())
}
