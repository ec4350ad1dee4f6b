//! Classification CLI command
//!
//! Classifies one or more records in a single invocation. The batch is
//! per-record fail-soft: every key is attempted, failures are reported
//! inline, and the command exits non-zero when any key failed.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::config::paths::PeriodPaths;
use crate::config::settings::Settings;
use crate::error::{FactureroError, FactureroResult};
use crate::models::{Catalog, ClassificationChoices, InvoiceKey, InvoiceRecord};
use crate::services::{Classifier, DestinationContext, ScanOptions};
use crate::storage::Storage;

use super::scan::run_scan;

/// Arguments for the classify command
#[derive(Args)]
pub struct ClassifyArgs {
    /// Period root directory
    pub root: PathBuf,

    /// Document key to classify (repeat for a batch)
    #[arg(short, long = "key", required = true)]
    pub keys: Vec<String>,

    /// Top-level category (COMPRAS, GASTOS, OGND)
    #[arg(short, long)]
    pub category: String,

    /// Subtype under the category
    #[arg(short, long)]
    pub subtype: Option<String>,

    /// Account under the subtype
    #[arg(short, long)]
    pub account: Option<String>,

    /// Counterparty folder (defaults to each record's issuer name)
    #[arg(short = 'p', long)]
    pub counterparty: Option<String>,

    /// Operator recorded in the ledger
    #[arg(short, long)]
    pub operator: Option<String>,

    /// Client folder inside the accounting tree
    #[arg(long)]
    pub client: Option<String>,

    /// Accounting drive root (defaults to the configured drive)
    #[arg(long)]
    pub drive: Option<PathBuf>,

    /// Fiscal year folder (defaults to the year resolved from each key)
    #[arg(long)]
    pub year: Option<i32>,
}

/// Handle the classify command
pub fn handle_classify_command(settings: &Settings, args: ClassifyArgs) -> FactureroResult<()> {
    let storage = Storage::new(PeriodPaths::new(&args.root))?;
    storage.load_all()?;
    let catalog = storage.catalog.load()?;

    let mut choices = ClassificationChoices::new(&args.category);
    if let Some(subtype) = &args.subtype {
        choices = choices.with_subtype(subtype);
    }
    if let Some(account) = &args.account {
        choices = choices.with_account(account);
    }
    if let Some(counterparty) = &args.counterparty {
        choices = choices.with_counterparty(counterparty);
    }
    if let Some(operator) = &args.operator {
        choices = choices.with_operator(operator);
    }
    choices.normalize();

    if let Some(notice) = catalog_notice(&catalog, &choices) {
        println!("{}", notice);
        println!();
    }

    let outcome = run_scan(&args.root, &ScanOptions::default());
    let mut records: HashMap<InvoiceKey, InvoiceRecord> = outcome
        .records
        .into_iter()
        .map(|record| (record.key.clone(), record))
        .collect();

    let drive = args
        .drive
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.network_drive));
    let client = args.client.clone().unwrap_or_default();
    let today = Local::now().date_naive();

    let mut moved = 0;
    let mut intents = 0;
    let mut failures = 0;

    for raw_key in &args.keys {
        let shown = raw_key.trim();
        let result = InvoiceKey::parse(raw_key).and_then(|key| {
            let record = records
                .get_mut(&key)
                .ok_or_else(|| FactureroError::record_not_found(key.as_str()))?;

            let year = resolve_fiscal_year(settings, args.year, &key);
            let ctx = DestinationContext::new(drive.clone(), client.clone(), year, today);
            Classifier::new(&storage, ctx).classify(record, &choices)
        });

        match result {
            Ok(Some(destination)) => {
                moved += 1;
                println!("{}  ->  {}", shown, destination.display());
            }
            Ok(None) => {
                intents += 1;
                println!("{}  recorded as pendiente_pdf (no evidence file yet)", shown);
            }
            Err(e) => {
                failures += 1;
                println!("{}  error: {}", shown, e);
            }
        }
    }

    println!();
    println!("Classification complete");
    println!("  Moved:       {}", moved);
    if intents > 0 {
        println!("  Intent only: {}", intents);
    }
    if failures > 0 {
        println!("  Failed:      {}", failures);
        return Err(FactureroError::Validation(format!(
            "{} of {} classifications failed",
            failures,
            args.keys.len()
        )));
    }

    Ok(())
}

/// Fiscal year for one key: explicit flag, then the key's own year when
/// that year is open, then the configured active year
fn resolve_fiscal_year(settings: &Settings, flag: Option<i32>, key: &InvoiceKey) -> i32 {
    flag.or_else(|| settings.fiscal_year_for_key(key))
        .unwrap_or(settings.fiscal_year)
}

/// One-line notice when the chosen taxonomy levels are not in the catalog
///
/// Classification does not require catalog membership; the notice exists
/// so typos surface before an operator files a whole batch under them.
fn catalog_notice(catalog: &Catalog, choices: &ClassificationChoices) -> Option<String> {
    if !catalog.contains_category(&choices.category) {
        return Some(format!(
            "Note: category '{}' is not in the account catalog",
            choices.category
        ));
    }

    let subtype = choices.subtype.as_deref()?;
    if !catalog.contains_subtype(&choices.category, subtype) {
        return Some(format!(
            "Note: subtype '{}' is not in the catalog under '{}'",
            subtype, choices.category
        ));
    }

    let account = choices.account.as_deref()?;
    if !catalog.contains_account(&choices.category, subtype, account) {
        return Some(format!(
            "Note: account '{}' is not in the catalog under '{}/{}'",
            account, choices.category, subtype
        ));
    }

    None
}
