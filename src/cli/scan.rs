//! Scan CLI command
//!
//! Indexes a period root, prints the registry as scanned, and optionally
//! persists a JSON audit report under `.metadata/reports/`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Args;
use log::warn;
use serde::Serialize;

use crate::config::paths::PeriodPaths;
use crate::display::{format_omissions, format_registry, format_scan_summary};
use crate::error::{FactureroError, FactureroResult};
use crate::extract::{EvidenceScanner, HaciendaXml};
use crate::models::Omission;
use crate::services::{Indexer, ScanOptions, ScanOutcome, ScanStats};

/// Audit reports kept under `.metadata/reports/`
const MAX_SCAN_REPORTS: usize = 20;

/// Arguments for the scan command
#[derive(Args)]
pub struct ScanArgs {
    /// Period root directory (contains XML/ and PDF/)
    pub root: PathBuf,

    /// Only keep records issued on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only keep records issued on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Write a JSON audit report under .metadata/reports/
    #[arg(long)]
    pub report: bool,
}

/// Handle the scan command
pub fn handle_scan_command(args: ScanArgs) -> FactureroResult<()> {
    let options = ScanOptions {
        from: parse_date_flag("--from", args.from.as_deref())?,
        to: parse_date_flag("--to", args.to.as_deref())?,
    };

    let outcome = run_scan(&args.root, &options);

    print!("{}", format_registry(&outcome.records));
    println!();
    print!("{}", format_scan_summary(&outcome.stats));

    if !outcome.omissions.is_empty() {
        println!();
        print!("{}", format_omissions(&outcome.omissions));
    }

    if args.report {
        let path = write_scan_report(&args.root, &outcome)?;
        println!();
        println!("Scan report written to: {}", path.display());
    }

    Ok(())
}

/// Run one scan with the bundled extractors
pub fn run_scan(root: &Path, options: &ScanOptions) -> ScanOutcome {
    let metadata = HaciendaXml;
    let evidence = EvidenceScanner::new();
    Indexer::new(&metadata, &evidence).scan(root, options)
}

/// Parse a date flag, rejecting anything that is not `YYYY-MM-DD`
pub fn parse_date_flag(flag: &str, value: Option<&str>) -> FactureroResult<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                FactureroError::Validation(format!(
                    "Invalid {} date '{}'; expected YYYY-MM-DD",
                    flag, text
                ))
            }),
    }
}

/// What one scan report file contains
#[derive(Serialize)]
struct ScanReport<'a> {
    generated_at: String,
    period_root: String,
    stats: &'a ScanStats,
    omissions: &'a [Omission],
}

/// Persist the scan outcome as a timestamped JSON report
///
/// Older reports are pruned so the directory never holds more than
/// [`MAX_SCAN_REPORTS`] files.
fn write_scan_report(root: &Path, outcome: &ScanOutcome) -> FactureroResult<PathBuf> {
    let reports_dir = PeriodPaths::new(root).reports_dir();
    fs::create_dir_all(&reports_dir)
        .map_err(|e| FactureroError::Io(format!("Failed to create reports directory: {}", e)))?;

    let report = ScanReport {
        generated_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        period_root: root.display().to_string(),
        stats: &outcome.stats,
        omissions: &outcome.omissions,
    };

    let name = format!("scan-{}.json", Local::now().format("%Y%m%d-%H%M%S"));
    let path = reports_dir.join(name);
    let contents = serde_json::to_string_pretty(&report)?;
    fs::write(&path, contents)
        .map_err(|e| FactureroError::Io(format!("Failed to write scan report: {}", e)))?;

    prune_reports(&reports_dir);
    Ok(path)
}

/// Remove the oldest reports beyond the retention limit
///
/// Report names are timestamped, so lexicographic order is age order.
/// Pruning problems are logged, never fatal.
fn prune_reports(reports_dir: &Path) {
    let entries = match fs::read_dir(reports_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", reports_dir.display(), e);
            return;
        }
    };

    let mut reports: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("scan-") && n.ends_with(".json"))
                .unwrap_or(false)
        })
        .collect();

    reports.sort();
    while reports.len() > MAX_SCAN_REPORTS {
        let oldest = reports.remove(0);
        if let Err(e) = fs::remove_file(&oldest) {
            warn!("Cannot prune old scan report {}: {}", oldest.display(), e);
        }
    }
}
