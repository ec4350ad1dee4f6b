use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use facturero::cli::{
    handle_audit_command, handle_catalog_command, handle_classify_command, handle_config_command,
    handle_export_command, handle_ledger_command, handle_record_command, handle_registry_command,
    handle_scan_command, CatalogCommands, ClassifyArgs, ConfigCommands, ExportCommands,
    LedgerCommands, ScanArgs,
};
use facturero::config::{paths::FactureroPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "facturero",
    author = "Kaylee Beyene",
    version,
    about = "Electronic invoice reconciliation for Costa Rican accounting firms",
    long_about = "Facturero reconciles the Hacienda XML documents and the printable \
                  evidence files an accounting firm receives each month. It pairs \
                  both by their 50-digit numeric key, tracks what is still missing, \
                  and files classified evidence into the shared accounting drive \
                  under the firm's category taxonomy."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a period directory and print the registry as found on disk
    Scan(ScanArgs),

    /// Print the reconciled registry (scan plus ledger states)
    #[command(alias = "reg")]
    Registry {
        /// Period root directory (contains XML/ and PDF/)
        root: PathBuf,
    },

    /// Show one record in full detail
    Record {
        /// Period root directory (contains XML/ and PDF/)
        root: PathBuf,

        /// 50-digit numeric document key
        key: String,
    },

    /// Classify records and move their evidence to the accounting drive
    Classify(ClassifyArgs),

    /// Classification ledger commands
    #[command(subcommand)]
    Ledger(LedgerCommands),

    /// Show recent audit trail entries
    Audit {
        /// Period root directory (contains XML/ and PDF/)
        root: PathBuf,

        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Account catalog commands
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Export commands
    #[command(subcommand)]
    Export(ExportCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // Shared settings live outside any one period directory
    let paths = FactureroPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Scan(args)) => handle_scan_command(args)?,
        Some(Commands::Registry { root }) => handle_registry_command(root)?,
        Some(Commands::Record { root, key }) => handle_record_command(root, &key)?,
        Some(Commands::Classify(args)) => handle_classify_command(&settings, args)?,
        Some(Commands::Ledger(cmd)) => handle_ledger_command(cmd)?,
        Some(Commands::Audit { root, count }) => handle_audit_command(root, count)?,
        Some(Commands::Catalog(cmd)) => handle_catalog_command(cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(cmd)?,
        Some(Commands::Config(cmd)) => handle_config_command(&paths, &mut settings, cmd)?,
        None => {
            println!("Facturero - Electronic invoice reconciliation");
            println!();
            println!("Run 'facturero --help' for usage information.");
            println!("Run 'facturero scan <period>' to index a period directory.");
        }
    }

    Ok(())
}
