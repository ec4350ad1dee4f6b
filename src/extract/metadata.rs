//! Hacienda XML metadata adapter
//!
//! Reads the header fields the engine needs out of Costa Rican electronic
//! documents (Factura, Tiquete, Nota de Crédito/Débito). Acknowledgment
//! messages (`MensajeHacienda`, `MensajeReceptor`) share the XML folder
//! and are recognized but not indexed.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{FactureroError, FactureroResult};
use crate::models::TaxBreakdown;

use super::{InvoiceMetadata, MetadataSource};

/// Display name per indexable root element
///
/// `None` for anything else, acknowledgment messages included.
fn document_type_name(root: &str) -> Option<&'static str> {
    match root {
        "FacturaElectronica" => Some("Factura Electrónica"),
        "TiqueteElectronico" => Some("Tiquete Electrónico"),
        "NotaCreditoElectronica" => Some("Nota de Crédito"),
        "NotaDebitoElectronica" => Some("Nota de Débito"),
        _ => None,
    }
}

/// IVA rate for a `CodigoTarifaIVA` value
///
/// Codes outside the named rates (exempt, 0%, 10%, unknown) land in the
/// `otros` bucket.
fn tariff_code_rate(code: &str) -> Option<&'static str> {
    match code {
        "02" => Some("1"),
        "03" => Some("2"),
        "04" => Some("4"),
        "05" => Some("8"),
        "08" => Some("13"),
        _ => None,
    }
}

/// Metadata source backed by quick-xml
#[derive(Debug, Default, Clone, Copy)]
pub struct HaciendaXml;

impl MetadataSource for HaciendaXml {
    fn read(&self, path: &Path) -> FactureroResult<Option<InvoiceMetadata>> {
        let bytes = std::fs::read(path).map_err(|e| {
            FactureroError::Metadata(format!("cannot read {}: {}", path.display(), e))
        })?;
        let content = String::from_utf8_lossy(&bytes);

        parse_document(content.trim_start_matches('\u{feff}'))
    }
}

/// Tax figures gathered while walking the document
///
/// Newer documents carry `ResumenFactura/TotalDesgloseImpuesto` summary
/// nodes; older ones only have per-line `Impuesto` entries. The summary is
/// authoritative whenever present, even when its amounts are empty.
#[derive(Default)]
struct TaxCollector {
    summary_seen: bool,
    summary: Vec<(String, String)>,
    node_tariff: String,
    node_amount: String,
    detail_rates: Vec<String>,
    detail_amounts: Vec<String>,
    detail_net: Vec<String>,
}

impl TaxCollector {
    fn capture(&mut self, path: &[String], text: &str) {
        if path_ends_with(path, &["TotalDesgloseImpuesto", "CodigoTarifaIVA"]) {
            self.node_tariff = text.trim().to_string();
        } else if path_ends_with(path, &["TotalDesgloseImpuesto", "TotalMontoImpuesto"]) {
            self.node_amount = text.trim().to_string();
        } else if path_ends_with(path, &["Impuesto", "Tarifa"]) {
            self.detail_rates.push(text.trim().to_string());
        } else if path_ends_with(path, &["Impuesto", "Monto"]) {
            self.detail_amounts.push(text.trim().to_string());
        } else if path_ends_with(path, &["LineaDetalle", "ImpuestoNeto"]) {
            self.detail_net.push(text.trim().to_string());
        }
    }

    fn finish_summary_node(&mut self) {
        self.summary_seen = true;
        if !self.node_amount.is_empty() {
            self.summary
                .push((std::mem::take(&mut self.node_tariff), std::mem::take(&mut self.node_amount)));
        } else {
            self.node_tariff.clear();
        }
    }

    fn into_breakdown(self) -> TaxBreakdown {
        // 1, 2, 4, 8, 13, otros
        let mut sums = [0.0f64; 6];
        let mut add = |rate: Option<&str>, raw: &str| {
            let Some(amount) = parse_amount(raw) else {
                return;
            };
            let slot = match rate {
                Some("1") => 0,
                Some("2") => 1,
                Some("4") => 2,
                Some("8") => 3,
                Some("13") => 4,
                _ => 5,
            };
            sums[slot] += amount;
        };

        if self.summary_seen {
            for (code, amount) in &self.summary {
                add(tariff_code_rate(code), amount);
            }
        } else {
            // Per-line ImpuestoNeto already accounts for exonerations;
            // prefer it when the counts line up.
            let amounts = if !self.detail_net.is_empty()
                && self.detail_net.len() == self.detail_rates.len()
            {
                &self.detail_net
            } else {
                &self.detail_amounts
            };
            for (idx, rate) in self.detail_rates.iter().enumerate() {
                let Some(amount) = amounts.get(idx) else {
                    continue;
                };
                add(normalize_tax_rate(rate).as_deref(), amount);
            }
        }

        TaxBreakdown {
            iva_1: format_amount(sums[0]),
            iva_2: format_amount(sums[1]),
            iva_4: format_amount(sums[2]),
            iva_8: format_amount(sums[3]),
            iva_13: format_amount(sums[4]),
            iva_otros: format_amount(sums[5]),
        }
    }
}

/// Parse one document from its XML text
///
/// Field selectors match on path suffixes under the root element, so the
/// adapter is indifferent to namespace declarations and schema version.
fn parse_document(xml: &str) -> FactureroResult<Option<InvoiceMetadata>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = String::new();
    let mut meta = InvoiceMetadata::default();
    let mut taxes = TaxCollector::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if root.is_empty() {
                    root = name.clone();
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    capture_field(&mut meta, &path, &text);
                    taxes.capture(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("TotalDesgloseImpuesto") {
                    taxes.finish_summary_node();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FactureroError::Metadata(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    let Some(type_name) = document_type_name(&root) else {
        // Acknowledgments and foreign documents are skipped, not errors
        return Ok(None);
    };
    meta.document_type = type_name.to_string();
    meta.issue_date = normalize_issue_date(&meta.issue_date);
    meta.subtotal = normalize_amount(&meta.subtotal);
    meta.tax = taxes.into_breakdown();
    meta.tax_total = normalize_amount(&meta.tax_total);
    meta.total = normalize_amount(&meta.total);
    if root == "NotaCreditoElectronica" {
        for field in [
            &mut meta.subtotal,
            &mut meta.tax.iva_1,
            &mut meta.tax.iva_2,
            &mut meta.tax.iva_4,
            &mut meta.tax.iva_8,
            &mut meta.tax.iva_13,
            &mut meta.tax.iva_otros,
            &mut meta.tax_total,
            &mut meta.total,
        ] {
            *field = negate_amount(field);
        }
    }

    Ok(Some(meta))
}

fn capture_field(meta: &mut InvoiceMetadata, path: &[String], text: &str) {
    // Root-level fields sit at depth 2; party fields are matched by
    // suffix so Receptor/Nombre never bleeds into the issuer name.
    if path.len() == 2 && path[1] == "Clave" && meta.raw_key.is_empty() {
        meta.raw_key = text.trim().to_string();
    } else if path.len() == 2 && path[1] == "FechaEmision" && meta.issue_date.is_empty() {
        meta.issue_date = text.trim().to_string();
    } else if path_ends_with(path, &["Emisor", "Nombre"]) && meta.issuer_name.is_empty() {
        meta.issuer_name = text.trim().to_string();
    } else if path_ends_with(path, &["Emisor", "Identificacion", "Numero"])
        && meta.issuer_id.is_empty()
    {
        meta.issuer_id = text.trim().to_string();
    } else if path_ends_with(path, &["Receptor", "Nombre"]) && meta.receiver_name.is_empty() {
        meta.receiver_name = text.trim().to_string();
    } else if path_ends_with(path, &["Receptor", "Identificacion", "Numero"])
        && meta.receiver_id.is_empty()
    {
        meta.receiver_id = text.trim().to_string();
    } else if path_ends_with(path, &["ResumenFactura", "TotalVentaNeta"])
        && meta.subtotal.is_empty()
    {
        meta.subtotal = text.trim().to_string();
    } else if path_ends_with(path, &["ResumenFactura", "TotalImpuesto"])
        && meta.tax_total.is_empty()
    {
        meta.tax_total = text.trim().to_string();
    } else if path_ends_with(path, &["ResumenFactura", "TotalComprobante"]) && meta.total.is_empty()
    {
        meta.total = text.trim().to_string();
    }
}

fn path_ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

/// Normalize an issue date to `dd/mm/YYYY`
///
/// Documents carry RFC 3339 timestamps with offsets; older files show up
/// with bare datetimes or dates. An unrecognized value passes through
/// unchanged rather than being dropped.
fn normalize_issue_date(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format("%d/%m/%Y").to_string();
    }

    let prefix19: String = value.chars().take(19).collect();
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&prefix19, pattern) {
            return dt.format("%d/%m/%Y").to_string();
        }
    }

    let prefix10: String = value.chars().take(10).collect();
    for pattern in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&prefix10, pattern) {
            return d.format("%d/%m/%Y").to_string();
        }
    }

    value.to_string()
}

/// Parse an amount in either separator convention
///
/// Accepts `1234.56`, `1.234,56` and `1,234.56`; whichever separator
/// appears last is the decimal one.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');
    let dotted = if has_comma && has_dot {
        if cleaned.rfind(',') > cleaned.rfind('.') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.replace(',', "")
        }
    } else if has_comma {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    dotted.parse::<f64>().ok()
}

/// Format an amount in local decimal notation (comma separator)
///
/// Trailing zeros after the decimal are dropped.
fn format_amount(value: f64) -> String {
    let mut text = format!("{:.5}", value);
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    text.replace('.', ",")
}

/// Normalize an amount to local decimal notation
///
/// Unparseable input becomes the empty string.
fn normalize_amount(raw: &str) -> String {
    match parse_amount(raw) {
        Some(value) => format_amount(value),
        None => String::new(),
    }
}

/// IVA rate as one of the bucket names (`"13"`, `"4"`, ...)
fn normalize_tax_rate(raw: &str) -> Option<String> {
    let text = raw.trim().replace(',', ".");
    if text.is_empty() {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    if value.fract() == 0.0 {
        Some(format!("{}", value as i64))
    } else {
        Some(text)
    }
}

fn negate_amount(amount: &str) -> String {
    if amount.is_empty() || amount == "0" || amount.starts_with('-') {
        return amount.to_string();
    }
    format!("-{}", amount)
}
