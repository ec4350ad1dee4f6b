//! Registry display formatting
//!
//! Formats invoice records for terminal display: the registry table the
//! `registry` command prints and the per-record detail view.

use crate::models::{InvoiceRecord, LedgerRow, RecordState};

/// Format a single record for display (registry row)
pub fn format_record_row(record: &InvoiceRecord) -> String {
    let date = if record.issue_date.is_empty() {
        "-".to_string()
    } else {
        truncate(&record.issue_date, 10)
    };

    let issuer = if record.issuer_name.is_empty() {
        "(no issuer)".to_string()
    } else {
        record.issuer_name.clone()
    };

    let total = if record.total.is_empty() {
        "-"
    } else {
        &record.total
    };

    format!(
        "{:13} {:10} {:24} {:>12} {}",
        record.state.as_str(),
        date,
        truncate(&issuer, 24),
        total,
        record.key
    )
}

/// Format the registry as a table
///
/// Rows keep the order the indexer produced (issue date, then key). The
/// trailing line counts records per reconciliation state.
pub fn format_registry(records: &[InvoiceRecord]) -> String {
    if records.is_empty() {
        return "No records found in this period.\n\n\
                Drop metadata documents under XML/ and evidence files under PDF/.\n"
            .to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:13} {:10} {:24} {:>12} {}\n",
        "State", "Date", "Issuer", "Total", "Key"
    ));
    output.push_str(&"-".repeat(113));
    output.push('\n');

    for record in records {
        output.push_str(&format_record_row(record));
        output.push('\n');
    }

    output.push_str(&"-".repeat(113));
    output.push('\n');
    output.push_str(&format_state_counts(records));
    output.push('\n');

    output
}

/// One-line per-state breakdown (`4 records: 2 pendiente, 2 clasificado`)
pub fn format_state_counts(records: &[InvoiceRecord]) -> String {
    let states = [
        RecordState::Pending,
        RecordState::PendingEvidence,
        RecordState::MissingMetadata,
        RecordState::Classified,
    ];

    let breakdown: Vec<String> = states
        .iter()
        .filter_map(|state| {
            let count = records.iter().filter(|r| r.state == *state).count();
            if count > 0 {
                Some(format!("{} {}", count, state.as_str()))
            } else {
                None
            }
        })
        .collect();

    let noun = if records.len() == 1 { "record" } else { "records" };
    if breakdown.is_empty() {
        format!("{} {}", records.len(), noun)
    } else {
        format!("{} {}: {}", records.len(), noun, breakdown.join(", "))
    }
}

/// Format record details for display
pub fn format_record_details(record: &InvoiceRecord, ledger_row: Option<&LedgerRow>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Record:      {}\n", record.key));
    output.push_str(&format!("State:       {}\n", record.state));

    if !record.issue_date.is_empty() {
        output.push_str(&format!("Issued:      {}\n", record.issue_date));
    }

    if !record.document_type.is_empty() {
        output.push_str(&format!("Type:        {}\n", record.document_type));
    }

    let issuer = identity(&record.issuer_name, &record.issuer_id);
    if !issuer.is_empty() {
        output.push_str(&format!("Issuer:      {}\n", issuer));
    }

    let receiver = identity(&record.receiver_name, &record.receiver_id);
    if !receiver.is_empty() {
        output.push_str(&format!("Receiver:    {}\n", receiver));
    }

    if !record.subtotal.is_empty() {
        output.push_str(&format!("Subtotal:    {}\n", record.subtotal));
    }

    if !record.tax_total.is_empty() {
        output.push_str(&format!("Tax:         {}\n", record.tax_total));
    }

    let rates = [
        ("IVA 1%:", &record.tax.iva_1),
        ("IVA 2%:", &record.tax.iva_2),
        ("IVA 4%:", &record.tax.iva_4),
        ("IVA 8%:", &record.tax.iva_8),
        ("IVA 13%:", &record.tax.iva_13),
        ("IVA otros:", &record.tax.iva_otros),
    ];
    for (label, amount) in rates {
        if !amount.is_empty() {
            output.push_str(&format!("  {:11}{}\n", label, amount));
        }
    }

    if !record.total.is_empty() {
        output.push_str(&format!("Total:       {}\n", record.total));
    }

    match &record.metadata_path {
        Some(path) => output.push_str(&format!("Metadata:    {}\n", path.display())),
        None => output.push_str("Metadata:    (not found)\n"),
    }
    match &record.evidence_path {
        Some(path) => output.push_str(&format!("Evidence:    {}\n", path.display())),
        None => output.push_str("Evidence:    (not found)\n"),
    }

    if let Some(row) = ledger_row {
        output.push('\n');
        output.push_str("Classification:\n");
        output.push_str(&format!("  {:14}{}\n", "Category:", row.category));
        if !row.subtype.is_empty() {
            output.push_str(&format!("  {:14}{}\n", "Subtype:", row.subtype));
        }
        if !row.account.is_empty() {
            output.push_str(&format!("  {:14}{}\n", "Account:", row.account));
        }
        if !row.counterparty.is_empty() {
            output.push_str(&format!("  {:14}{}\n", "Counterparty:", row.counterparty));
        }
        if !row.destination_path.is_empty() {
            output.push_str(&format!("  {:14}{}\n", "Destination:", row.destination_path));
        }
        if !row.sha256.is_empty() {
            output.push_str(&format!("  {:14}{}\n", "SHA-256:", row.sha256));
        }
        output.push_str(&format!(
            "  {:14}{} by {}\n",
            "Classified:", row.classified_at, row.operator
        ));
    }

    output
}

fn identity(name: &str, id: &str) -> String {
    match (name.is_empty(), id.is_empty()) {
        (false, false) => format!("{} ({})", name, id),
        (false, true) => name.to_string(),
        (true, false) => id.to_string(),
        (true, true) => String::new(),
    }
}

/// Truncate a string to a maximum display width
///
/// Counts characters, not bytes; issuer names carry accented letters.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}
