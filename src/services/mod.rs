//! Service layer for Facturero
//!
//! The service layer provides the engine's operations on top of storage:
//! period indexing, destination resolution, the verified move, and
//! catalog curation.

pub mod catalog;
pub mod classifier;
pub mod destination;
pub mod import;
pub mod indexer;
pub mod mover;

pub use catalog::{AccountEntry, CatalogService};
pub use classifier::Classifier;
pub use destination::{resolve_destination, DestinationContext};
pub use import::{ImportOptions, ImportService, ImportSummary};
pub use indexer::{apply_ledger_states, Indexer, ScanOptions, ScanOutcome, ScanStats};
pub use mover::{deliver, sha256_file, Delivery};
