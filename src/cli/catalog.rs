//! Account catalog CLI commands
//!
//! Implements catalog management: the tree listing, single account
//! add/remove, and the legacy chart-of-accounts import.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::paths::PeriodPaths;
use crate::display::format_catalog_tree;
use crate::error::FactureroResult;
use crate::services::{CatalogService, ImportOptions, ImportService};
use crate::storage::Storage;

/// Catalog subcommands
#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Show the account catalog as a tree
    List {
        /// Period root directory
        root: PathBuf,
    },

    /// Add an account to the catalog
    Add {
        /// Period root directory
        root: PathBuf,
        /// Category (COMPRAS, GASTOS, ...)
        category: String,
        /// Subtype under the category
        subtype: String,
        /// Account name
        account: String,
    },

    /// Remove an account from the catalog
    Remove {
        /// Period root directory
        root: PathBuf,
        /// Category
        category: String,
        /// Subtype under the category
        subtype: String,
        /// Account name
        account: String,
    },

    /// Import accounts from a legacy chart-of-accounts listing
    Import {
        /// Period root directory
        root: PathBuf,
        /// Delimited listing file (code|name|parent-code)
        file: PathBuf,
        /// Field delimiter
        #[arg(long, default_value = "|")]
        delimiter: char,
        /// The file has no header row
        #[arg(long)]
        no_header: bool,
    },
}

/// Handle a catalog command
pub fn handle_catalog_command(cmd: CatalogCommands) -> FactureroResult<()> {
    match cmd {
        CatalogCommands::List { root } => {
            let storage = Storage::new(PeriodPaths::new(&root))?;
            let service = CatalogService::new(&storage);

            let catalog = service.catalog()?;
            print!("{}", format_catalog_tree(&catalog));
        }

        CatalogCommands::Add {
            root,
            category,
            subtype,
            account,
        } => {
            let storage = Storage::new(PeriodPaths::new(&root))?;
            let service = CatalogService::new(&storage);

            let entry = service.add_account(&category, &subtype, &account)?;
            println!("Added account: {}", entry.path());
        }

        CatalogCommands::Remove {
            root,
            category,
            subtype,
            account,
        } => {
            let storage = Storage::new(PeriodPaths::new(&root))?;
            let service = CatalogService::new(&storage);

            let entry = service.remove_account(&category, &subtype, &account)?;
            println!("Removed account: {}", entry.path());
        }

        CatalogCommands::Import {
            root,
            file,
            delimiter,
            no_header,
        } => {
            let storage = Storage::new(PeriodPaths::new(&root))?;
            let service = ImportService::new(&storage);

            let options = ImportOptions::default()
                .with_delimiter(delimiter)
                .with_header(!no_header);
            let summary = service.import_file(&file, &options)?;

            println!("Import complete");
            println!("  Added:           {}", summary.added);
            println!("  Duplicates:      {}", summary.duplicates);
            println!("  Unknown parents: {}", summary.unknown_parents);
            if !summary.errors.is_empty() {
                println!("  Errors:          {}", summary.errors.len());
                for message in &summary.errors {
                    println!("    {}", message);
                }
            }
        }
    }

    Ok(())
}
