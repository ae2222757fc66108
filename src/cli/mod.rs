pub mod export;
pub mod groups;
pub mod init;
pub mod review;
pub mod status;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::error::{KasboekError, Result};
use crate::importer::{load_transactions, raw_files, ImportOutcome};
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(
    name = "kasboek",
    about = "Bank-statement review and categorization for Dutch CSV exports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up kasboek: choose a data directory and create its layout.
    Init {
        /// Path for kasboek data (default: ~/Documents/kasboek)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show data locations and review progress.
    Status,
    /// Interactively categorize transactions.
    Review,
    /// List recurring transaction groups.
    Groups,
    /// Write the reviewed table to a semicolon-delimited export file.
    Export {
        /// Output file path (default: <data_dir>/export.csv)
        #[arg(long)]
        output: Option<String>,
    },
}

/// Load the enriched table for a command: raw exports plus the persisted
/// store, with ingest problems reported to stderr.
pub(crate) fn load_table() -> Result<(Settings, ImportOutcome)> {
    let settings = load_settings();
    let files = raw_files(&settings.raw_data_dir())?;
    if files.is_empty() {
        return Err(KasboekError::Other(format!(
            "no raw exports in {} \u{2014} run `kasboek init` and drop bank export files there",
            settings.raw_data_dir().display()
        )));
    }
    let outcome = load_transactions(&files, &settings.store_path())?;
    report_ingest_problems(&outcome);
    Ok((settings, outcome))
}

pub(crate) fn report_ingest_problems(outcome: &ImportOutcome) {
    for (_file, error) in &outcome.failed_files {
        // MissingColumn already names the file
        eprintln!("{} file skipped: {error}", "warning:".yellow());
    }
    for row in &outcome.skipped {
        eprintln!(
            "{} {} line {}: row skipped ({})",
            "warning:".yellow(),
            row.file,
            row.line,
            row.error
        );
    }
}
