//! Export CLI commands
//!
//! Writes the reconciled registry or the classification ledger to CSV
//! or YAML, into a file or onto stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::config::paths::PeriodPaths;
use crate::error::{FactureroError, FactureroResult};
use crate::export::{
    export_ledger_csv, export_ledger_yaml, export_records_csv, export_records_yaml,
};
use crate::models::{InvoiceRecord, LedgerRow};
use crate::services::{apply_ledger_states, ScanOptions};
use crate::storage::Storage;

use super::scan::run_scan;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (spreadsheet-compatible)
    Csv,
    /// YAML format (human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the reconciled registry
    Records {
        /// Period root directory (contains XML/ and PDF/)
        root: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the classification ledger
    Ledger {
        /// Period root directory (contains XML/ and PDF/)
        root: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle export commands
pub fn handle_export_command(cmd: ExportCommands) -> FactureroResult<()> {
    match cmd {
        ExportCommands::Records {
            root,
            format,
            output,
        } => handle_export_records(root, format, output),
        ExportCommands::Ledger {
            root,
            format,
            output,
        } => handle_export_ledger(root, format, output),
    }
}

/// Export the registry with ledger states applied
fn handle_export_records(
    root: PathBuf,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> FactureroResult<()> {
    let storage = Storage::new(PeriodPaths::new(&root))?;
    storage.load_all()?;

    let mut outcome = run_scan(&root, &ScanOptions::default());
    let ledger = storage.ledger.get_all()?;
    apply_ledger_states(&mut outcome.records, &ledger);

    match output {
        Some(path) => {
            let mut writer = create_output(&path)?;
            write_records(&outcome.records, format, &mut writer)?;
            println!(
                "Exported {} records to: {}",
                outcome.records.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            write_records(&outcome.records, format, &mut stdout.lock())?;
        }
    }

    Ok(())
}

/// Export the classification ledger in key order
fn handle_export_ledger(
    root: PathBuf,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> FactureroResult<()> {
    let storage = Storage::new(PeriodPaths::new(&root))?;
    storage.load_all()?;

    let rows = storage.ledger.rows_sorted()?;

    match output {
        Some(path) => {
            let mut writer = create_output(&path)?;
            write_ledger(&rows, format, &mut writer)?;
            println!("Exported {} ledger rows to: {}", rows.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_ledger(&rows, format, &mut stdout.lock())?;
        }
    }

    Ok(())
}

fn create_output(path: &Path) -> FactureroResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        FactureroError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

fn write_records<W: Write>(
    records: &[InvoiceRecord],
    format: ExportFormat,
    writer: &mut W,
) -> FactureroResult<()> {
    match format {
        ExportFormat::Csv => export_records_csv(records, writer),
        ExportFormat::Yaml => export_records_yaml(records, writer),
    }
}

fn write_ledger<W: Write>(
    rows: &[LedgerRow],
    format: ExportFormat,
    writer: &mut W,
) -> FactureroResult<()> {
    match format {
        ExportFormat::Csv => export_ledger_csv(rows, writer),
        ExportFormat::Yaml => export_ledger_yaml(rows, writer),
    }
}
