//! List command - show persisted cheques, newest first.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;

use cheqr_core::models::{ChequeField, StoredCheque};
use cheqr_core::store::{ChequeStore, SqliteStore};

use super::load_config;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Only show cheques for this party code
    #[arg(long)]
    party: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact table
    Table,
    /// JSON array
    Json,
    /// CSV rows
    Csv,
}

pub async fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = Arc::new(SqliteStore::open(&config.store)?);

    let mut cheques = store.list_cheques()?;
    if let Some(party) = &args.party {
        cheques.retain(|c| c.party_code.as_deref() == Some(party.as_str()));
    }

    if cheques.is_empty() {
        println!("{} No cheques stored.", style("ℹ").blue());
        return Ok(());
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&cheques)?,
        OutputFormat::Csv => to_csv(&cheques)?,
        OutputFormat::Table => to_table(&cheques),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} record(s) written to {}",
            style("✓").green(),
            cheques.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }
    Ok(())
}

fn to_csv(cheques: &[StoredCheque]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = vec!["id"];
    header.extend(ChequeField::ALL.iter().map(|f| f.as_str()));
    header.extend(["party_code", "created_at"]);
    writer.write_record(&header)?;

    for cheque in cheques {
        let mut row: Vec<String> = vec![cheque.id.to_string()];
        for field in ChequeField::ALL {
            row.push(cheque.fields.get(&field).cloned().unwrap_or_default());
        }
        row.push(cheque.party_code.clone().unwrap_or_default());
        row.push(cheque.created_at.to_rfc3339());
        writer.write_record(&row)?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

fn to_table(cheques: &[StoredCheque]) -> String {
    let mut out = format!(
        "{:>5}  {:10}  {:16}  {:12}  {:20}  {}\n",
        "id", "party", "account", "amount", "payer", "created"
    );
    for cheque in cheques {
        let field = |f: ChequeField| cheque.fields.get(&f).cloned().unwrap_or_default();
        out.push_str(&format!(
            "{:>5}  {:10}  {:16}  {:12}  {:20}  {}\n",
            cheque.id,
            cheque.party_code.as_deref().unwrap_or("-"),
            field(ChequeField::AccountNumber),
            field(ChequeField::AmountInDigits),
            field(ChequeField::Payer),
            cheque.created_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    out
}
