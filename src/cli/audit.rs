//! Audit trail CLI command

use std::path::PathBuf;

use crate::config::paths::PeriodPaths;
use crate::error::FactureroResult;
use crate::storage::Storage;

/// Handle the audit command
///
/// Prints the most recent audit trail entries, oldest first.
pub fn handle_audit_command(root: PathBuf, count: usize) -> FactureroResult<()> {
    let storage = Storage::new(PeriodPaths::new(&root))?;

    let entries = storage.audit.read_recent(count)?;
    if entries.is_empty() {
        println!("No audit entries recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }

    let total = storage.audit.entry_count()?;
    println!();
    println!("Showing {} of {} entries", entries.len(), total);

    Ok(())
}
