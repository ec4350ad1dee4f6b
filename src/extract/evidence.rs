//! Key extraction from evidence files
//!
//! Evidence PDFs carry the 50-digit document key in the file name far
//! more often than not, so reading bytes is the fallback, never the
//! first move. A large share of what lands in the evidence tree is not
//! an invoice at all (bank vouchers, statements, circulars); name and
//! folder heuristics run before any file is opened.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::key::KEY_LEN;
use crate::models::{InvoiceKey, OmissionReason};

use super::{EvidenceOutcome, EvidenceSource};

const DEFAULT_SCAN_BUDGET: Duration = Duration::from_secs(4);

static KEY_IN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{50}").expect("key-in-name regex"));

/// Keys inside PDF streams always start with the country prefix;
/// anchoring on it keeps compressed-stream noise out of the candidates.
static KEY_IN_BYTES: Lazy<regex::bytes::Regex> =
    Lazy::new(|| regex::bytes::Regex::new(r"506\d{47}").expect("key-in-bytes regex"));

/// Substrings that mark a file name as administrative rather than fiscal.
const NON_INVOICE_NAME_MARKERS: &[&str] = &[
    // marketing
    "brochure",
    "catalogo",
    "promocion",
    "oferta",
    "descuento",
    "comunicado",
    "aviso",
    "noticia",
    "boletin",
    "circular",
    // purchasing paperwork
    "orden de compra",
    "order",
    "pedido",
    "detallepedido",
    "requisicion",
    "solicitud",
    "request",
    // service-operator changes
    "cambio de comercializador",
    "cambio operador",
    "cambio de proveedor",
    // manuals and legal texts
    "manual",
    "guia",
    "instructivo",
    "politica",
    "terminosy",
    "resolucion",
    "reglamento",
    "contrato",
    // manual receipts
    "recibo manual",
    "ticket manual",
    "recibo deposito",
    "constancia",
    // reports and statements
    "reporte",
    "informe",
    "resumen",
    "estado de cuenta",
    "extracto",
    "comprobante de registro de planilla",
    // bank traffic
    "soporte sinpe",
    "notificacion",
    "comprobante transferencia",
    // correspondence
    "carta",
    "oficio",
    "memo",
    "memorandum",
    // junk
    "junk",
    "basura",
    "spam",
];

/// Folder names under which banks drop transaction vouchers.
const BANK_FOLDER_MARKERS: &[&str] = &[
    "bn email comercios",
    "notificacionescajerovirtual",
    "notificaciones cajero virtual",
    "bncr",
    "sinpe",
    "banco nacional",
    "banco de costa rica",
    "bac san jose",
    "bac credomatic",
    "scotiabank",
    "davivienda",
    "promerica",
];

/// Scans evidence files for document keys
///
/// Extraction order per file: administrative-name screen, key in the
/// file name, then a raw-bytes scan whose finds are reported only as
/// candidates. Bank-folder files get the byte scan as a last chance
/// before being discarded as non-invoices.
pub struct EvidenceScanner {
    scan_budget: Duration,
}

impl EvidenceScanner {
    pub fn new() -> Self {
        Self {
            scan_budget: DEFAULT_SCAN_BUDGET,
        }
    }

    /// Override the per-file scan budget.
    pub fn with_budget(scan_budget: Duration) -> Self {
        Self { scan_budget }
    }

    /// Collect distinct structurally plausible keys from raw bytes,
    /// in order of first appearance.
    fn scan_bytes(&self, data: &[u8]) -> Vec<InvoiceKey> {
        let mut found: Vec<InvoiceKey> = Vec::new();
        for m in KEY_IN_BYTES.find_iter(data) {
            let Ok(digits) = std::str::from_utf8(m.as_bytes()) else {
                continue;
            };
            if !plausible_key_digits(digits) {
                continue;
            }
            let Ok(key) = InvoiceKey::parse(digits) else {
                continue;
            };
            if !found.contains(&key) {
                found.push(key);
            }
        }
        found
    }
}

impl Default for EvidenceScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl EvidenceSource for EvidenceScanner {
    fn extract(&self, path: &Path) -> EvidenceOutcome {
        let started = Instant::now();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // A full key in the file name settles it without opening the file.
        if let Some(key) = key_from_name(&name) {
            return EvidenceOutcome::Hit {
                key,
                issuer_id: None,
            };
        }

        if is_non_invoice_name(&name) {
            return EvidenceOutcome::Miss {
                reason: OmissionReason::NotInvoice,
                candidates: Vec::new(),
                detail: "discarded by administrative-name screen".to_string(),
            };
        }

        // Bank-folder files still get the byte scan: a real invoice
        // forwarded through a bank mailbox must link, not vanish.
        let bank_folder = under_bank_folder(path);

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::PermissionDenied => {
                return EvidenceOutcome::Miss {
                    reason: OmissionReason::Corrupted,
                    candidates: Vec::new(),
                    detail: format!("permission denied: {err}"),
                };
            }
            Err(err) => {
                return EvidenceOutcome::Miss {
                    reason: OmissionReason::Corrupted,
                    candidates: Vec::new(),
                    detail: format!("unreadable evidence file: {err}"),
                };
            }
        };

        if data.is_empty() {
            return EvidenceOutcome::Miss {
                reason: OmissionReason::Corrupted,
                candidates: Vec::new(),
                detail: "evidence file is empty".to_string(),
            };
        }

        let candidates = self.scan_bytes(&data);

        if started.elapsed() > self.scan_budget {
            return EvidenceOutcome::Miss {
                reason: OmissionReason::Timeout,
                candidates,
                detail: format!("scan budget of {:?} exhausted", self.scan_budget),
            };
        }

        if !candidates.is_empty() {
            debug!(
                "evidence {}: {} raw-bytes candidate(s)",
                name,
                candidates.len()
            );
            return EvidenceOutcome::Miss {
                reason: OmissionReason::ExtractionFailure,
                candidates,
                detail: "keys found in raw bytes need an existing record to link".to_string(),
            };
        }

        if bank_folder {
            return EvidenceOutcome::Miss {
                reason: OmissionReason::NotInvoice,
                candidates: Vec::new(),
                detail: "bank folder and no key in raw bytes".to_string(),
            };
        }

        EvidenceOutcome::Miss {
            reason: OmissionReason::ExtractionFailure,
            candidates: Vec::new(),
            detail: "no 50-digit key in name or raw bytes".to_string(),
        }
    }
}

fn key_from_name(name: &str) -> Option<InvoiceKey> {
    let m = KEY_IN_NAME.find(name)?;
    InvoiceKey::parse(m.as_str()).ok()
}

/// True when the file name reads as administrative mail rather than an
/// invoice. Bank voucher names also collapse to a short alphabetic
/// prefix followed by a transaction number once separators are removed.
fn is_non_invoice_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    if NON_INVOICE_NAME_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return true;
    }

    let stem = lowered.rsplit_once('.').map_or(lowered.as_str(), |(s, _)| s);
    let compact: String = stem
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect();
    for prefix in ["rr", "rd"] {
        if let Some(rest) = compact.strip_prefix(prefix) {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}

/// True when one of the three nearest parent folders belongs to a bank.
fn under_bank_folder(path: &Path) -> bool {
    path.ancestors()
        .skip(1)
        .take(3)
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_lowercase())
        .any(|folder| BANK_FOLDER_MARKERS.iter().any(|m| folder.contains(m)))
}

/// Structural screen for byte-scan matches: the date segment must be a
/// real day and month and the situation digit must be 1 through 4.
fn plausible_key_digits(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    if bytes.len() != KEY_LEN {
        return false;
    }
    let day = two_digits(bytes, 3);
    let month = two_digits(bytes, 5);
    let situation = bytes[41] - b'0';
    (1..=31).contains(&day) && (1..=12).contains(&month) && (1..=4).contains(&situation)
}

fn two_digits(bytes: &[u8], at: usize) -> u8 {
    (bytes[at] - b'0') * 10 + (bytes[at + 1] - b'0')
}
