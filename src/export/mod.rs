//! Export module for Facturero
//!
//! Writes the scan registry and the classification ledger out in two
//! formats:
//! - CSV: spreadsheet-compatible, one row per record
//! - YAML: human-readable, full field fidelity
//!
//! All writers are generic over `Write` so output can go to a file,
//! stdout, or a test buffer.

pub mod csv;
pub mod yaml;

pub use self::csv::{export_ledger_csv, export_records_csv};
pub use yaml::{export_ledger_yaml, export_records_yaml};
