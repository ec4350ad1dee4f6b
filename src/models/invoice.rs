//! Invoice record model
//!
//! Represents one logical invoice inside a period: the union of what we
//! know from its metadata document and its evidence file, plus the
//! reconciliation state derived from which of the two are present.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::key::InvoiceKey;

/// Reconciliation state of a record
///
/// Wire names are fixed; they appear in the ledger, in scan reports and in
/// files written by earlier versions of the tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecordState {
    /// Metadata and evidence both present, not yet classified
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    /// Metadata present, evidence still missing
    #[serde(rename = "pendiente_pdf")]
    PendingEvidence,
    /// Evidence present, metadata document never found
    #[serde(rename = "sin_xml")]
    MissingMetadata,
    /// Evidence moved into the accounting tree and recorded in the ledger
    #[serde(rename = "clasificado")]
    Classified,
}

impl RecordState {
    /// Derive the state from which halves of the record are present
    ///
    /// `Classified` is never derived here; only the move executor assigns it.
    pub fn from_presence(has_metadata: bool, has_evidence: bool) -> Self {
        match (has_metadata, has_evidence) {
            (true, true) => Self::Pending,
            (true, false) => Self::PendingEvidence,
            _ => Self::MissingMetadata,
        }
    }

    /// The fixed wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::PendingEvidence => "pendiente_pdf",
            Self::MissingMetadata => "sin_xml",
            Self::Classified => "clasificado",
        }
    }

    /// Check if this record has already been filed
    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Classified)
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tax amounts per IVA rate
///
/// Documents break total tax down by tariff; the named rates are the ones
/// accounting reports care about, everything else lands in `iva_otros`.
/// Amounts are wire strings in local decimal notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    #[serde(default)]
    pub iva_1: String,
    #[serde(default)]
    pub iva_2: String,
    #[serde(default)]
    pub iva_4: String,
    #[serde(default)]
    pub iva_8: String,
    #[serde(default)]
    pub iva_13: String,
    #[serde(default)]
    pub iva_otros: String,
}

/// One logical invoice inside a period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// The 50-digit document key
    #[serde(rename = "clave")]
    pub key: InvoiceKey,

    /// Issue date as the document carries it (`dd/mm/YYYY`)
    #[serde(rename = "fecha_emision", default)]
    pub issue_date: String,

    /// Issuer display name
    #[serde(rename = "emisor_nombre", default)]
    pub issuer_name: String,

    /// Issuer tax id
    #[serde(rename = "emisor_cedula", default)]
    pub issuer_id: String,

    /// Receiver display name
    #[serde(rename = "receptor_nombre", default)]
    pub receiver_name: String,

    /// Receiver tax id
    #[serde(rename = "receptor_cedula", default)]
    pub receiver_id: String,

    /// Display name of the document type (Factura Electrónica, ...)
    #[serde(rename = "tipo_documento", default)]
    pub document_type: String,

    /// Net total before tax
    #[serde(default)]
    pub subtotal: String,

    /// Tax amounts by IVA rate
    #[serde(flatten)]
    pub tax: TaxBreakdown,

    /// Total tax amount
    #[serde(rename = "impuesto_total", default)]
    pub tax_total: String,

    /// Total amount as the document carries it
    #[serde(rename = "total_comprobante", default)]
    pub total: String,

    /// Path of the metadata document, when found
    #[serde(rename = "xml_path")]
    pub metadata_path: Option<PathBuf>,

    /// Path of the evidence file, when found
    #[serde(rename = "pdf_path")]
    pub evidence_path: Option<PathBuf>,

    /// Reconciliation state
    #[serde(rename = "estado", default)]
    pub state: RecordState,
}

impl InvoiceRecord {
    /// Create an empty record for a key
    pub fn new(key: InvoiceKey) -> Self {
        Self {
            key,
            issue_date: String::new(),
            issuer_name: String::new(),
            issuer_id: String::new(),
            receiver_name: String::new(),
            receiver_id: String::new(),
            document_type: String::new(),
            subtotal: String::new(),
            tax: TaxBreakdown::default(),
            tax_total: String::new(),
            total: String::new(),
            metadata_path: None,
            evidence_path: None,
            state: RecordState::PendingEvidence,
        }
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata_path.is_some()
    }

    pub fn has_evidence(&self) -> bool {
        self.evidence_path.is_some()
    }

    /// Re-derive the state from path presence
    ///
    /// A record the move executor already marked `Classified` keeps that
    /// state; everything else follows [`RecordState::from_presence`].
    pub fn recompute_state(&mut self) {
        if self.state.is_classified() {
            return;
        }
        self.state = RecordState::from_presence(self.has_metadata(), self.has_evidence());
    }

    /// Issue date as a calendar date, when it parses
    ///
    /// Documents normally carry `dd/mm/YYYY`; files written by hand or by
    /// older tooling show up as `YYYY-mm-dd`. Anything else is `None`.
    pub fn parsed_issue_date(&self) -> Option<NaiveDate> {
        let text = self.issue_date.trim();
        if text.is_empty() {
            return None;
        }
        for format in ["%d/%m/%Y", "%Y-%m-%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date);
            }
        }
        None
    }
}

/// Why an evidence file could not be linked to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    /// The file is recognizably not an invoice (statements, vouchers, reports)
    NotInvoice,
    /// The extraction scan gave up before covering the file
    Timeout,
    /// The file was scanned but no usable key was found
    ExtractionFailure,
    /// The file could not be read at all
    Corrupted,
}

impl OmissionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInvoice => "not_invoice",
            Self::Timeout => "timeout",
            Self::ExtractionFailure => "extraction_failure",
            Self::Corrupted => "corrupted",
        }
    }
}

impl fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotInvoice => "not an invoice",
            Self::Timeout => "scan timed out",
            Self::ExtractionFailure => "no key found",
            Self::Corrupted => "unreadable file",
        };
        write!(f, "{}", text)
    }
}

/// An evidence file excluded from the registry
///
/// Omissions never become records; they are kept for audit reporting so an
/// operator can see exactly which files a scan left behind and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Omission {
    #[serde(rename = "archivo")]
    pub path: PathBuf,

    #[serde(rename = "razon")]
    pub reason: OmissionReason,

    /// Free-form context (candidate counts, parse error text)
    #[serde(rename = "detalle", default)]
    pub detail: String,
}

impl Omission {
    pub fn new(path: impl Into<PathBuf>, reason: OmissionReason, detail: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> InvoiceKey {
        InvoiceKey::parse("50614032401011234560000100001010000000011199999999").unwrap()
    }

    #[test]
    fn test_state_from_presence() {
        assert_eq!(RecordState::from_presence(true, true), RecordState::Pending);
        assert_eq!(
            RecordState::from_presence(true, false),
            RecordState::PendingEvidence
        );
        assert_eq!(
            RecordState::from_presence(false, true),
            RecordState::MissingMetadata
        );
        assert_eq!(
            RecordState::from_presence(false, false),
            RecordState::MissingMetadata
        );
    }

    #[test]
    fn test_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&RecordState::PendingEvidence).unwrap(),
            "\"pendiente_pdf\""
        );
        let state: RecordState = serde_json::from_str("\"sin_xml\"").unwrap();
        assert_eq!(state, RecordState::MissingMetadata);
    }

    #[test]
    fn test_recompute_state() {
        let mut record = InvoiceRecord::new(key());
        record.metadata_path = Some(PathBuf::from("a.xml"));
        record.recompute_state();
        assert_eq!(record.state, RecordState::PendingEvidence);

        record.evidence_path = Some(PathBuf::from("a.pdf"));
        record.recompute_state();
        assert_eq!(record.state, RecordState::Pending);
    }

    #[test]
    fn test_recompute_keeps_classified() {
        let mut record = InvoiceRecord::new(key());
        record.state = RecordState::Classified;
        record.recompute_state();
        assert_eq!(record.state, RecordState::Classified);
    }

    #[test]
    fn test_omission_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&OmissionReason::NotInvoice).unwrap(),
            "\"not_invoice\""
        );
        assert_eq!(OmissionReason::ExtractionFailure.as_str(), "extraction_failure");
    }

    #[test]
    fn test_record_wire_names_include_tax_columns() {
        let mut record = InvoiceRecord::new(key());
        record.receiver_name = "CLIENTE FINAL".to_string();
        record.tax.iva_13 = "1300".to_string();
        record.tax_total = "1300".to_string();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["receptor_nombre"], "CLIENTE FINAL");
        // TaxBreakdown flattens into the record itself
        assert_eq!(json["iva_13"], "1300");
        assert_eq!(json["impuesto_total"], "1300");
        assert!(json.get("tax").is_none());
    }

    #[test]
    fn test_parsed_issue_date_accepts_both_formats() {
        let mut record = InvoiceRecord::new(key());

        record.issue_date = "14/03/2024".to_string();
        assert_eq!(
            record.parsed_issue_date(),
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );

        record.issue_date = "2024-03-14".to_string();
        assert_eq!(
            record.parsed_issue_date(),
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );

        record.issue_date = "14 de marzo".to_string();
        assert_eq!(record.parsed_issue_date(), None);

        record.issue_date = String::new();
        assert_eq!(record.parsed_issue_date(), None);
    }
}
