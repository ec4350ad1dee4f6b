//! CSV Export functionality
//!
//! Exports the registry and the classification ledger to CSV. Column
//! names are the Spanish wire names so the files line up with what the
//! accountants already work with.

use std::io::Write;

use crate::error::{FactureroError, FactureroResult};
use crate::models::{InvoiceRecord, LedgerRow};

/// Export registry records to CSV
pub fn export_records_csv<W: Write>(records: &[InvoiceRecord], writer: &mut W) -> FactureroResult<()> {
    writeln!(
        writer,
        "clave,fecha_emision,emisor_nombre,emisor_cedula,receptor_nombre,receptor_cedula,\
         tipo_documento,subtotal,iva_1,iva_2,iva_4,iva_8,iva_13,iva_otros,impuesto_total,\
         total_comprobante,estado,xml_path,pdf_path"
    )
    .map_err(|e| FactureroError::Export(e.to_string()))?;

    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.key,
            record.issue_date,
            escape_csv(&record.issuer_name),
            record.issuer_id,
            escape_csv(&record.receiver_name),
            record.receiver_id,
            escape_csv(&record.document_type),
            record.subtotal,
            record.tax.iva_1,
            record.tax.iva_2,
            record.tax.iva_4,
            record.tax.iva_8,
            record.tax.iva_13,
            record.tax.iva_otros,
            record.tax_total,
            record.total,
            record.state,
            escape_csv(&path_text(record.metadata_path.as_deref())),
            escape_csv(&path_text(record.evidence_path.as_deref()))
        )
        .map_err(|e| FactureroError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Export ledger rows to CSV
pub fn export_ledger_csv<W: Write>(rows: &[LedgerRow], writer: &mut W) -> FactureroResult<()> {
    writeln!(
        writer,
        "clave_numerica,estado,categoria,subtipo,nombre_cuenta,proveedor,ruta_origen,\
         ruta_destino,sha256,fecha_clasificacion,clasificado_por"
    )
    .map_err(|e| FactureroError::Export(e.to_string()))?;

    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{}",
            row.key,
            row.state,
            escape_csv(&row.category),
            escape_csv(&row.subtype),
            escape_csv(&row.account),
            escape_csv(&row.counterparty),
            escape_csv(&row.source_path),
            escape_csv(&row.destination_path),
            row.sha256,
            row.classified_at,
            escape_csv(&row.operator)
        )
        .map_err(|e| FactureroError::Export(e.to_string()))?;
    }

    Ok(())
}

fn path_text(path: Option<&std::path::Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

/// Escape a string for CSV format
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::models::{ClassificationChoices, InvoiceKey, TaxBreakdown};

    use super::*;

    const KEY: &str = "50614032401011234560000100001010000000011199999999";

    fn test_record() -> InvoiceRecord {
        let mut record = InvoiceRecord::new(InvoiceKey::parse(KEY).unwrap());
        record.issue_date = "14/03/2024".to_string();
        record.issuer_name = "COMERCIAL X, S.A.".to_string();
        record.issuer_id = "3101123456".to_string();
        record.receiver_name = "CLIENTE DEMO".to_string();
        record.document_type = "Factura Electrónica".to_string();
        record.subtotal = "10000".to_string();
        record.tax = TaxBreakdown {
            iva_13: "1300".to_string(),
            ..TaxBreakdown::default()
        };
        record.tax_total = "1300".to_string();
        record.total = "11300".to_string();
        record.metadata_path = Some(PathBuf::from("/period/XML/doc.xml"));
        record.recompute_state();
        record
    }

    #[test]
    fn test_export_records_csv() {
        let records = vec![test_record()];

        let mut output = Vec::new();
        export_records_csv(&records, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("clave,fecha_emision"));
        let row = lines.next().unwrap();
        assert!(row.starts_with(KEY));
        // Comma in the issuer name forces quoting
        assert!(row.contains("\"COMERCIAL X, S.A.\""));
        assert!(row.contains(",1300,"));
        assert!(row.contains("pendiente_pdf"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_export_ledger_csv() {
        let choices = ClassificationChoices::new("COMPRAS").with_counterparty("FERRETERIA EPA");
        let rows = vec![LedgerRow::classified(
            InvoiceKey::parse(KEY).unwrap(),
            &choices,
            "/period/PDF/a.pdf",
            "/drive/PF-2024/a.pdf",
            "deadbeef",
        )];

        let mut output = Vec::new();
        export_ledger_csv(&rows, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with("clave_numerica,estado"));
        assert!(text.contains("clasificado,COMPRAS"));
        assert!(text.contains("FERRETERIA EPA"));
        assert!(text.contains("deadbeef"));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
