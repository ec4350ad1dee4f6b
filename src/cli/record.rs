//! Record detail CLI command

use std::path::PathBuf;

use crate::config::paths::PeriodPaths;
use crate::display::format_record_details;
use crate::error::{FactureroError, FactureroResult};
use crate::models::InvoiceKey;
use crate::services::{apply_ledger_states, ScanOptions};
use crate::storage::Storage;

use super::scan::run_scan;

/// Handle the record command
///
/// Shows everything known about one key: the scanned record and, when
/// present, its ledger row.
pub fn handle_record_command(root: PathBuf, key: &str) -> FactureroResult<()> {
    let key = InvoiceKey::parse(key)?;

    let storage = Storage::new(PeriodPaths::new(&root))?;
    storage.load_all()?;

    let mut outcome = run_scan(&root, &ScanOptions::default());
    let ledger = storage.ledger.get_all()?;
    apply_ledger_states(&mut outcome.records, &ledger);

    let record = outcome
        .records
        .iter()
        .find(|r| r.key == key)
        .ok_or_else(|| FactureroError::record_not_found(key.as_str()))?;

    print!("{}", format_record_details(record, ledger.get(&key)));
    Ok(())
}
