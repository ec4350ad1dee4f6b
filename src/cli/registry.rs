//! Registry CLI command
//!
//! Prints the reconciled registry for a period: the scan result with the
//! ledger overlay applied, so classified records show as `clasificado`
//! even though their evidence has left the tree.

use std::path::PathBuf;

use crate::config::paths::PeriodPaths;
use crate::display::format_registry;
use crate::error::FactureroResult;
use crate::services::{apply_ledger_states, ScanOptions};
use crate::storage::Storage;

use super::scan::run_scan;

/// Handle the registry command
pub fn handle_registry_command(root: PathBuf) -> FactureroResult<()> {
    let storage = Storage::new(PeriodPaths::new(&root))?;
    storage.load_all()?;

    let mut outcome = run_scan(&root, &ScanOptions::default());
    let ledger = storage.ledger.get_all()?;
    apply_ledger_states(&mut outcome.records, &ledger);

    print!("{}", format_registry(&outcome.records));
    Ok(())
}
