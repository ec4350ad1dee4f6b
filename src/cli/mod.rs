//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod export;
pub mod ledger;
pub mod record;
pub mod registry;
pub mod scan;

pub use audit::handle_audit_command;
pub use catalog::{handle_catalog_command, CatalogCommands};
pub use classify::{handle_classify_command, ClassifyArgs};
pub use config::{handle_config_command, ConfigCommands};
pub use export::{handle_export_command, ExportCommands};
pub use ledger::{handle_ledger_command, LedgerCommands};
pub use record::handle_record_command;
pub use registry::handle_registry_command;
pub use scan::{handle_scan_command, ScanArgs};
