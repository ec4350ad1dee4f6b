//! Display formatting for terminal output
//!
//! Provides utilities for formatting registry, ledger and catalog data
//! for terminal display, including tables and tree views.

pub mod catalog;
pub mod ledger;
pub mod record;
pub mod scan;

pub use catalog::format_catalog_tree;
pub use ledger::{format_ledger_row_details, format_ledger_table};
pub use record::{format_record_details, format_registry};
pub use scan::{format_omissions, format_scan_summary};
