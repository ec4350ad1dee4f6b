//! Ledger CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::paths::PeriodPaths;
use crate::display::{format_ledger_row_details, format_ledger_table};
use crate::error::{FactureroError, FactureroResult};
use crate::models::InvoiceKey;
use crate::storage::Storage;

/// Ledger subcommands
#[derive(Subcommand)]
pub enum LedgerCommands {
    /// List all classification ledger rows
    List {
        /// Period root directory
        root: PathBuf,
    },

    /// Show one ledger row in detail
    Show {
        /// Period root directory
        root: PathBuf,
        /// Document key
        key: String,
    },
}

/// Handle a ledger command
pub fn handle_ledger_command(cmd: LedgerCommands) -> FactureroResult<()> {
    match cmd {
        LedgerCommands::List { root } => {
            let storage = Storage::new(PeriodPaths::new(&root))?;
            storage.load_all()?;

            let rows = storage.ledger.rows_sorted()?;
            print!("{}", format_ledger_table(&rows));
        }

        LedgerCommands::Show { root, key } => {
            let key = InvoiceKey::parse(&key)?;
            let storage = Storage::new(PeriodPaths::new(&root))?;
            storage.load_all()?;

            let row = storage
                .ledger
                .get(&key)?
                .ok_or_else(|| FactureroError::ledger_row_not_found(key.as_str()))?;
            print!("{}", format_ledger_row_details(&row));
        }
    }

    Ok(())
}
