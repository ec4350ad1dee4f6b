//! Record indexer
//!
//! Builds the invoice registry for a period by merging two independent
//! streams: metadata documents under `<root>/XML` and evidence files under
//! `<root>/PDF`. The registry is rebuilt from disk on every scan; the only
//! state that survives between scans lives in the classification ledger.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::paths::PeriodPaths;
use crate::extract::{EvidenceOutcome, EvidenceSource, InvoiceMetadata, MetadataSource};
use crate::models::{InvoiceKey, InvoiceRecord, LedgerRow, Omission, OmissionReason, RecordState};

/// Optional issue-date window for a scan, both ends inclusive
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ScanOptions {
    /// Whether a record passes the date filter
    ///
    /// Records whose issue date does not parse are kept; the filter only
    /// excludes what it can prove is outside the window.
    fn includes(&self, record: &InvoiceRecord) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = record.parsed_issue_date() else {
            return true;
        };
        if self.from.map_or(false, |from| date < from) {
            return false;
        }
        if self.to.map_or(false, |to| date > to) {
            return false;
        }
        true
    }
}

/// Counters for one scan, persisted in the scan report
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    /// Metadata documents that parsed into a comprobante
    pub metadata_documents: usize,
    /// Metadata documents that could not be parsed
    pub metadata_errors: usize,
    /// Files seen under the evidence subtree
    pub evidence_files: usize,
    /// Evidence files attached to an existing record
    pub linked: usize,
    /// Records created from evidence alone
    pub synthesized: usize,
    pub omitted_not_invoice: usize,
    pub omitted_timeout: usize,
    pub omitted_extraction_failure: usize,
    pub omitted_corrupted: usize,
    pub duration_ms: u64,
}

impl ScanStats {
    fn count_omission(&mut self, reason: OmissionReason) {
        match reason {
            OmissionReason::NotInvoice => self.omitted_not_invoice += 1,
            OmissionReason::Timeout => self.omitted_timeout += 1,
            OmissionReason::ExtractionFailure => self.omitted_extraction_failure += 1,
            OmissionReason::Corrupted => self.omitted_corrupted += 1,
        }
    }

    /// Total evidence files left out of the registry
    pub fn omitted(&self) -> usize {
        self.omitted_not_invoice
            + self.omitted_timeout
            + self.omitted_extraction_failure
            + self.omitted_corrupted
    }
}

/// Everything one scan produces
#[derive(Debug)]
pub struct ScanOutcome {
    /// Registry, ordered by (issue date, key)
    pub records: Vec<InvoiceRecord>,
    /// Evidence files that could not be linked
    pub omissions: Vec<Omission>,
    pub stats: ScanStats,
}

/// Builds the registry for a period root
///
/// The indexer owns no file-format knowledge; both streams come in
/// through the extraction seams.
pub struct Indexer<'a> {
    metadata_source: &'a dyn MetadataSource,
    evidence_source: &'a dyn EvidenceSource,
}

impl<'a> Indexer<'a> {
    /// Create a new indexer over the two extraction seams
    pub fn new(
        metadata_source: &'a dyn MetadataSource,
        evidence_source: &'a dyn EvidenceSource,
    ) -> Self {
        Self {
            metadata_source,
            evidence_source,
        }
    }

    /// Scan a period root and build its registry
    ///
    /// Never fails as a whole: unparseable documents become counters and
    /// log lines, unlinkable evidence becomes omissions. Missing `XML` or
    /// `PDF` folders simply contribute nothing.
    pub fn scan(&self, period_root: &Path, options: &ScanOptions) -> ScanOutcome {
        let started = Instant::now();
        let paths = PeriodPaths::new(period_root);

        let mut records: HashMap<InvoiceKey, InvoiceRecord> = HashMap::new();
        let mut omissions: Vec<Omission> = Vec::new();
        let mut stats = ScanStats::default();

        self.scan_metadata(&paths.xml_dir(), options, &mut records, &mut stats);
        self.scan_evidence(&paths.pdf_dir(), &mut records, &mut omissions, &mut stats);

        let mut records: Vec<InvoiceRecord> = records.into_values().collect();
        for record in &mut records {
            record.recompute_state();
        }
        records.sort_by(|a, b| {
            (a.parsed_issue_date(), a.issue_date.as_str(), &a.key)
                .cmp(&(b.parsed_issue_date(), b.issue_date.as_str(), &b.key))
        });

        stats.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "scan of {} finished in {} ms: {} records, {} linked, {} synthesized, {} omitted",
            period_root.display(),
            stats.duration_ms,
            records.len(),
            stats.linked,
            stats.synthesized,
            stats.omitted()
        );

        ScanOutcome {
            records,
            omissions,
            stats,
        }
    }

    fn scan_metadata(
        &self,
        xml_dir: &Path,
        options: &ScanOptions,
        records: &mut HashMap<InvoiceKey, InvoiceRecord>,
        stats: &mut ScanStats,
    ) {
        for path in walk_sorted(xml_dir) {
            if !has_extension(&path, "xml") {
                continue;
            }

            let meta = match self.metadata_source.read(&path) {
                Ok(Some(meta)) => meta,
                Ok(None) => {
                    debug!("not a comprobante, skipping {}", path.display());
                    continue;
                }
                Err(err) => {
                    warn!("cannot parse {}: {}", path.display(), err);
                    stats.metadata_errors += 1;
                    continue;
                }
            };
            stats.metadata_documents += 1;

            let key = match InvoiceKey::parse(&meta.raw_key) {
                Ok(key) => key,
                Err(err) => {
                    warn!("discarding {}: {}", path.display(), err);
                    continue;
                }
            };

            let record = record_from_metadata(key.clone(), meta, path);
            if !options.includes(&record) {
                debug!("outside the date window, skipping {}", key);
                continue;
            }

            // A key seen twice keeps the later document, matching the
            // sorted walk order.
            if let Some(previous) = records.insert(key, record) {
                warn!("duplicate metadata document for {}", previous.key);
            }
        }
    }

    fn scan_evidence(
        &self,
        pdf_dir: &Path,
        records: &mut HashMap<InvoiceKey, InvoiceRecord>,
        omissions: &mut Vec<Omission>,
        stats: &mut ScanStats,
    ) {
        for path in walk_sorted(pdf_dir) {
            stats.evidence_files += 1;

            match self.evidence_source.extract(&path) {
                EvidenceOutcome::Hit { key, issuer_id } => match records.entry(key) {
                    Entry::Occupied(mut entry) => {
                        let record = entry.get_mut();
                        if record.evidence_path.is_some() {
                            warn!(
                                "{} already has evidence, ignoring duplicate {}",
                                record.key,
                                path.display()
                            );
                        } else {
                            record.evidence_path = Some(path);
                            stats.linked += 1;
                        }
                    }
                    Entry::Vacant(entry) => {
                        let key = entry.key().clone();
                        debug!("no metadata for {}, synthesizing from evidence", key);
                        entry.insert(record_from_evidence(key, issuer_id, path));
                        stats.synthesized += 1;
                    }
                },
                EvidenceOutcome::Miss {
                    reason,
                    candidates,
                    detail,
                } => {
                    // Secondary candidates only ever link to a record that
                    // already exists and is still waiting for evidence.
                    let matching: Vec<InvoiceKey> = candidates
                        .iter()
                        .filter(|key| {
                            records
                                .get(key)
                                .map_or(false, |r| r.has_metadata() && !r.has_evidence())
                        })
                        .cloned()
                        .collect();

                    if let [key] = matching.as_slice() {
                        debug!(
                            "linked {} to {} via secondary candidate",
                            path.display(),
                            key
                        );
                        if let Some(record) = records.get_mut(key) {
                            record.evidence_path = Some(path);
                            stats.linked += 1;
                        }
                    } else {
                        if matching.len() > 1 {
                            debug!(
                                "{} candidates match waiting records for {}",
                                matching.len(),
                                path.display()
                            );
                        }
                        stats.count_omission(reason);
                        omissions.push(Omission::new(path, reason, detail));
                    }
                }
            }
        }
    }
}

/// Overlay classified ledger state onto freshly scanned records
///
/// Classified evidence has left the period tree, so a re-scan sees those
/// records as metadata-only; without the overlay they would re-appear as
/// `pendiente_pdf`.
pub fn apply_ledger_states(
    records: &mut [InvoiceRecord],
    ledger: &HashMap<InvoiceKey, LedgerRow>,
) {
    for record in records.iter_mut() {
        if let Some(row) = ledger.get(&record.key) {
            if row.state.is_classified() {
                record.state = RecordState::Classified;
            }
        }
    }
}

fn record_from_metadata(key: InvoiceKey, meta: InvoiceMetadata, path: PathBuf) -> InvoiceRecord {
    let mut record = InvoiceRecord::new(key);
    record.issue_date = meta.issue_date;
    record.issuer_name = meta.issuer_name;
    record.issuer_id = meta.issuer_id;
    record.receiver_name = meta.receiver_name;
    record.receiver_id = meta.receiver_id;
    record.document_type = meta.document_type;
    record.subtotal = meta.subtotal;
    record.tax = meta.tax;
    record.tax_total = meta.tax_total;
    record.total = meta.total;
    record.metadata_path = Some(path);
    record
}

fn record_from_evidence(
    key: InvoiceKey,
    issuer_id: Option<String>,
    path: PathBuf,
) -> InvoiceRecord {
    let mut record = InvoiceRecord::new(key);
    record.issue_date = issue_date_from_key(&record.key);
    record.issuer_id = issuer_id.unwrap_or_else(|| record.key.issuer_id().to_string());
    record.evidence_path = Some(path);
    record
}

/// Issue date encoded in the key itself, `dd/mm/20yy`
///
/// Empty when the key's date segments are not a calendar date.
fn issue_date_from_key(key: &InvoiceKey) -> String {
    let day = key.issue_day();
    let month = key.issue_month();
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return String::new();
    }
    format!("{:02}/{:02}/20{:02}", day, month, key.year_two_digits())
}

/// All files under a directory in a deterministic order
fn walk_sorted(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::extract::{EvidenceScanner, HaciendaXml};
    use crate::models::ClassificationChoices;

    use super::*;

    const KEY: &str = "50614032401011234560000100001010000000011199999999";
    const OTHER_KEY: &str = "50605062401019876540000100001010000000022199999999";
    const NOVEL_KEY: &str = "50614032401011234560000100001010000000011188888888";

    fn xml_doc(key: &str, issuer: &str, date: &str) -> String {
        format!(
            r#"<FacturaElectronica>
  <Clave>{key}</Clave>
  <FechaEmision>{date}</FechaEmision>
  <Emisor>
    <Nombre>{issuer}</Nombre>
    <Identificacion><Numero>3101000000</Numero></Identificacion>
  </Emisor>
  <ResumenFactura><TotalComprobante>1000.00</TotalComprobante></ResumenFactura>
</FacturaElectronica>"#
        )
    }

    fn write_xml(root: &Path, name: &str, content: &str) {
        let dir = root.join("XML");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn write_pdf(root: &Path, name: &str, content: &[u8]) {
        let dir = root.join("PDF");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn scan(root: &Path) -> ScanOutcome {
        scan_with(root, &ScanOptions::default())
    }

    fn scan_with(root: &Path, options: &ScanOptions) -> ScanOutcome {
        let metadata = HaciendaXml;
        let scanner = EvidenceScanner::new();
        Indexer::new(&metadata, &scanner).scan(root, options)
    }

    #[test]
    fn test_scan_merges_metadata_and_evidence() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "doc.xml", &xml_doc(KEY, "FERRETERIA EPA", "2024-03-14"));
        write_pdf(root, &format!("{KEY}.pdf"), b"%PDF");

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.key.as_str(), KEY);
        assert_eq!(record.issuer_name, "FERRETERIA EPA");
        assert_eq!(record.state, RecordState::Pending);
        assert!(record.metadata_path.is_some());
        assert!(record.evidence_path.is_some());
        assert_eq!(outcome.stats.metadata_documents, 1);
        assert_eq!(outcome.stats.linked, 1);
        assert_eq!(outcome.stats.synthesized, 0);
    }

    #[test]
    fn test_metadata_only_waits_for_evidence() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "doc.xml", &xml_doc(KEY, "EMISOR", "2024-03-14"));

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].state, RecordState::PendingEvidence);
    }

    #[test]
    fn test_novel_evidence_synthesizes_record() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pdf(root, &format!("{NOVEL_KEY}.pdf"), b"%PDF");

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.key.as_str(), NOVEL_KEY);
        assert_eq!(record.state, RecordState::MissingMetadata);
        assert_eq!(record.issuer_id, "010112345600");
        assert_eq!(record.issue_date, "14/03/2024");
        assert_eq!(outcome.stats.synthesized, 1);
    }

    #[test]
    fn test_secondary_candidate_links_to_waiting_record() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "doc.xml", &xml_doc(KEY, "EMISOR", "2024-03-14"));
        // No key in the name; the body carries the known key and a novel
        // one. Only the known key identifies a waiting record.
        let body = format!("escaneo con clave {NOVEL_KEY} y clave {KEY} adjuntas");
        write_pdf(root, "escaneo.pdf", body.as_bytes());

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.key.as_str(), KEY);
        assert_eq!(record.state, RecordState::Pending);
        assert!(record.evidence_path.is_some());
        assert!(outcome.omissions.is_empty());
        assert_eq!(outcome.stats.linked, 1);
        assert_eq!(outcome.stats.synthesized, 0);
    }

    #[test]
    fn test_ambiguous_candidates_become_omission() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "a.xml", &xml_doc(KEY, "UNO", "2024-03-14"));
        write_xml(root, "b.xml", &xml_doc(OTHER_KEY, "DOS", "2024-06-05"));
        let body = format!("dos claves: {KEY} {OTHER_KEY}");
        write_pdf(root, "escaneo.pdf", body.as_bytes());

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records.iter().all(|r| r.evidence_path.is_none()));
        assert_eq!(outcome.omissions.len(), 1);
        assert_eq!(
            outcome.omissions[0].reason,
            OmissionReason::ExtractionFailure
        );
        assert_eq!(outcome.stats.omitted_extraction_failure, 1);
    }

    #[test]
    fn test_omission_reasons_stay_distinguishable() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_pdf(root, "estado de cuenta marzo.pdf", b"sin clave");
        write_pdf(root, "vacio.pdf", b"");

        let outcome = scan(root);

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.omissions.len(), 2);
        assert_eq!(outcome.stats.omitted_not_invoice, 1);
        assert_eq!(outcome.stats.omitted_corrupted, 1);
        assert_eq!(outcome.stats.omitted(), 2);
    }

    #[test]
    fn test_date_window_filters_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "marzo.xml", &xml_doc(KEY, "UNO", "2024-03-14"));
        write_xml(root, "junio.xml", &xml_doc(OTHER_KEY, "DOS", "2024-06-05"));

        let options = ScanOptions {
            from: NaiveDate::from_ymd_opt(2024, 6, 1),
            to: NaiveDate::from_ymd_opt(2024, 6, 30),
        };
        let outcome = scan_with(root, &options);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].key.as_str(), OTHER_KEY);
    }

    #[test]
    fn test_unparseable_issue_date_survives_the_window() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "doc.xml", &xml_doc(KEY, "UNO", "sin fecha"));

        let options = ScanOptions {
            from: NaiveDate::from_ymd_opt(2024, 6, 1),
            to: NaiveDate::from_ymd_opt(2024, 6, 30),
        };
        let outcome = scan_with(root, &options);

        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_duplicate_metadata_keeps_the_later_document() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "a.xml", &xml_doc(KEY, "PRIMERO", "2024-03-14"));
        write_xml(root, "b.xml", &xml_doc(KEY, "SEGUNDO", "2024-03-14"));

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].issuer_name, "SEGUNDO");
        assert!(outcome.records[0]
            .metadata_path
            .as_ref()
            .unwrap()
            .ends_with("b.xml"));
    }

    #[test]
    fn test_duplicate_evidence_keeps_the_first_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "doc.xml", &xml_doc(KEY, "EMISOR", "2024-03-14"));
        write_pdf(root, &format!("a {KEY}.pdf"), b"%PDF primero");
        write_pdf(root, &format!("b {KEY}.pdf"), b"%PDF segundo");

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 1);
        let evidence = outcome.records[0].evidence_path.as_ref().unwrap();
        assert!(evidence.ends_with(format!("a {KEY}.pdf")));
        assert_eq!(outcome.stats.linked, 1);
    }

    #[test]
    fn test_records_sorted_by_date_then_key() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_xml(root, "junio.xml", &xml_doc(OTHER_KEY, "DOS", "2024-06-05"));
        write_xml(root, "marzo.xml", &xml_doc(KEY, "UNO", "2024-03-14"));

        let outcome = scan(root);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].key.as_str(), KEY);
        assert_eq!(outcome.records[1].key.as_str(), OTHER_KEY);
    }

    #[test]
    fn test_missing_folders_scan_empty() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = scan(temp_dir.path());

        assert!(outcome.records.is_empty());
        assert!(outcome.omissions.is_empty());
        assert_eq!(outcome.stats.evidence_files, 0);
    }

    #[test]
    fn test_apply_ledger_states_overlays_classified() {
        let key = InvoiceKey::parse(KEY).unwrap();
        let mut record = InvoiceRecord::new(key.clone());
        record.metadata_path = Some(PathBuf::from("doc.xml"));
        record.recompute_state();
        let mut records = vec![record];

        let choices = ClassificationChoices::new("COMPRAS");
        let row = LedgerRow::classified(key.clone(), &choices, "a.pdf", "b.pdf", "deadbeef");
        let mut ledger = HashMap::new();
        ledger.insert(key, row);

        apply_ledger_states(&mut records, &ledger);
        assert_eq!(records[0].state, RecordState::Classified);
    }

    #[test]
    fn test_apply_ledger_states_ignores_pending_rows() {
        let key = InvoiceKey::parse(KEY).unwrap();
        let mut record = InvoiceRecord::new(key.clone());
        record.metadata_path = Some(PathBuf::from("doc.xml"));
        record.recompute_state();
        let mut records = vec![record];

        let choices = ClassificationChoices::new("GASTOS");
        let row = LedgerRow::pending_evidence(key.clone(), &choices);
        let mut ledger = HashMap::new();
        ledger.insert(key, row);

        apply_ledger_states(&mut records, &ledger);
        assert_eq!(records[0].state, RecordState::PendingEvidence);
    }
}
