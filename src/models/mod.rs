//! Core data models for Facturero
//!
//! This module contains the data structures that represent the
//! reconciliation domain: document keys, invoice records and their
//! states, the account catalog, and classification ledger rows.

pub mod invoice;
pub mod key;
pub mod ledger;
pub mod taxonomy;

pub use invoice::{InvoiceRecord, Omission, OmissionReason, RecordState, TaxBreakdown};
pub use key::InvoiceKey;
pub use ledger::{ClassificationChoices, LedgerRow, DEFAULT_OPERATOR};
pub use taxonomy::Catalog;
