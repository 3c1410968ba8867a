//! Process command - extract per-page field records from a cheque document.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use cheqr_core::backend::build_backend;
use cheqr_core::models::{PageImage, PageResult, ProcessingStatus};
use cheqr_core::pdf::ScannedDocument;
use cheqr_core::pipeline::ChequePipeline;
use cheqr_core::store::SqliteStore;

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full page results as JSON
    Json,
    /// Plain text summary per page
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let pages = load_pages(&args.input)?;

    let backend = build_backend(&config.backend)?;
    let store = Arc::new(SqliteStore::open(&config.store)?);
    let pipeline = ChequePipeline::new(backend, store, &config);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Extracting {} page(s)...", pages.len()));

    let results = pipeline.process_document(&pages).await;
    pb.finish_with_message("Done");

    let output = format_results(&results, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    let degraded = results
        .iter()
        .filter(|r| r.processing_status == ProcessingStatus::Error)
        .count();
    if degraded > 0 {
        eprintln!(
            "{} {} page(s) degraded (backend failure or timeout)",
            style("!").yellow(),
            degraded
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// Rasterized pages for the input: embedded scans for a PDF, the file
/// itself for a single image.
fn load_pages(input: &PathBuf) -> anyhow::Result<Vec<PageImage>> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(input)?;
            let document = ScannedDocument::load(&data)?;
            debug!("Loaded PDF with {} pages", document.page_count());
            Ok(document.page_images()?)
        }
        "png" | "jpg" | "jpeg" | "tiff" | "bmp" => {
            let mime = match extension.as_str() {
                "png" => "image/png",
                "jpg" | "jpeg" => "image/jpeg",
                "tiff" => "image/tiff",
                _ => "image/bmp",
            };
            Ok(vec![PageImage {
                page_number: 1,
                bytes: fs::read(input)?,
                mime: mime.to_string(),
            }])
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

fn format_results(results: &[PageResult], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for page in results {
                out.push_str(&format!("Page {}\n", page.page_number));
                if page.processing_status == ProcessingStatus::Error {
                    out.push_str("  [error: no field data]\n");
                    continue;
                }
                for (field, value) in page.fields.iter() {
                    let flag = if value.needs_review { " (review)" } else { "" };
                    out.push_str(&format!(
                        "  {:20} {}{}\n",
                        field.as_str(),
                        value.value.as_deref().unwrap_or("-"),
                        flag
                    ));
                }
                if let Some(code) = &page.party_code {
                    out.push_str(&format!("  {:20} {}\n", "party_code", code));
                }
            }
            Ok(out)
        }
    }
}
