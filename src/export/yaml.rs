//! YAML Export functionality
//!
//! Exports the registry or the ledger as a YAML sequence with a short
//! comment header, for human inspection and ad-hoc tooling.

use std::io::Write;

use chrono::Local;

use crate::error::{FactureroError, FactureroResult};
use crate::models::{InvoiceRecord, LedgerRow};

/// Export registry records to YAML
pub fn export_records_yaml<W: Write>(
    records: &[InvoiceRecord],
    writer: &mut W,
) -> FactureroResult<()> {
    write_header(writer, "registry", records.len())?;
    serde_yaml::to_writer(writer, records).map_err(|e| FactureroError::Export(e.to_string()))?;
    Ok(())
}

/// Export ledger rows to YAML
pub fn export_ledger_yaml<W: Write>(rows: &[LedgerRow], writer: &mut W) -> FactureroResult<()> {
    write_header(writer, "ledger", rows.len())?;
    serde_yaml::to_writer(writer, rows).map_err(|e| FactureroError::Export(e.to_string()))?;
    Ok(())
}

fn write_header<W: Write>(writer: &mut W, what: &str, count: usize) -> FactureroResult<()> {
    writeln!(writer, "# Facturero {} export", what)
        .map_err(|e| FactureroError::Export(e.to_string()))?;
    writeln!(
        writer,
        "# Generated: {}",
        Local::now().format("%Y-%m-%dT%H:%M:%S")
    )
    .map_err(|e| FactureroError::Export(e.to_string()))?;
    writeln!(writer, "# Rows: {}", count).map_err(|e| FactureroError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::models::{ClassificationChoices, InvoiceKey, InvoiceRecord, LedgerRow};

    use super::*;

    const KEY: &str = "50614032401011234560000100001010000000011199999999";

    #[test]
    fn test_records_yaml_shape() {
        let mut record = InvoiceRecord::new(InvoiceKey::parse(KEY).unwrap());
        record.issuer_name = "FERRETERIA EPA".to_string();

        let mut output = Vec::new();
        export_records_yaml(&[record], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with("# Facturero registry export"));
        assert!(text.contains("# Rows: 1"));
        assert!(text.contains(KEY));
        assert!(text.contains("emisor_nombre: FERRETERIA EPA"));
    }

    #[test]
    fn test_ledger_yaml_round_trips() {
        let choices = ClassificationChoices::new("GASTOS").with_subtype("GASTOS GENERALES");
        let rows = vec![LedgerRow::pending_evidence(
            InvoiceKey::parse(KEY).unwrap(),
            &choices,
        )];

        let mut output = Vec::new();
        export_ledger_yaml(&rows, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        let body: String = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed: Vec<LedgerRow> = serde_yaml::from_str(&body).unwrap();
        assert_eq!(parsed, rows);
    }
}
