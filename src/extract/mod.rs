//! Extraction seams between the engine and raw files
//!
//! The indexer never touches file formats directly; it works through the
//! two traits here. The bundled adapters cover the real formats (Hacienda
//! XML metadata, digit-run scanning over evidence files) and tests swap in
//! table-driven fakes.

pub mod evidence;
pub mod metadata;
pub mod sanitize;

pub use evidence::EvidenceScanner;
pub use metadata::HaciendaXml;
pub use sanitize::sanitize_folder_name;

use std::path::Path;

use crate::error::FactureroResult;
use crate::models::{InvoiceKey, OmissionReason, TaxBreakdown};

/// Header fields read from one metadata document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceMetadata {
    /// Document key exactly as the file carries it; the indexer applies
    /// the 50-digit rule
    pub raw_key: String,
    /// Issue date normalized to `dd/mm/YYYY` when possible
    pub issue_date: String,
    pub issuer_name: String,
    pub issuer_id: String,
    pub receiver_name: String,
    pub receiver_id: String,
    /// Display name of the document type (Factura Electrónica, ...)
    pub document_type: String,
    /// Net total before tax, local decimal notation
    pub subtotal: String,
    /// Tax amounts by IVA rate
    pub tax: TaxBreakdown,
    /// Total tax amount
    pub tax_total: String,
    /// Total amount in local decimal notation
    pub total: String,
}

/// Reads invoice header data out of metadata documents
pub trait MetadataSource {
    /// Parse one document
    ///
    /// `Ok(None)` means the file is well-formed but not a comprobante
    /// (acknowledgment messages live in the same folder). `Err` means the
    /// file could not be parsed; scans collect these without stopping.
    fn read(&self, path: &Path) -> FactureroResult<Option<InvoiceMetadata>>;
}

/// Result of scanning one evidence file for a document key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidenceOutcome {
    /// A primary key was found
    Hit {
        key: InvoiceKey,
        /// Issuer tax id when the scan could also establish it
        issuer_id: Option<String>,
    },
    /// No primary key; candidates are secondary keys spotted in the raw
    /// bytes, only ever matched against records that already exist
    Miss {
        reason: OmissionReason,
        candidates: Vec<InvoiceKey>,
        detail: String,
    },
}

/// Extracts document keys from evidence files
pub trait EvidenceSource {
    /// Scan one file; failures are expressed as [`EvidenceOutcome::Miss`],
    /// never as errors, so one bad file cannot stop a scan
    fn extract(&self, path: &Path) -> EvidenceOutcome;
}
