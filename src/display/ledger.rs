//! Classification ledger display formatting

use crate::models::LedgerRow;

use super::record::truncate;

/// Format a single ledger row for display (table row)
pub fn format_ledger_row(row: &LedgerRow) -> String {
    let date = row.classified_at.get(..10).unwrap_or(&row.classified_at);

    let counterparty = if row.counterparty.is_empty() {
        "-".to_string()
    } else {
        row.counterparty.clone()
    };

    format!(
        "{:13} {:10} {:34} {:20} {}",
        row.state.as_str(),
        date,
        truncate(&category_path(row), 34),
        truncate(&counterparty, 20),
        row.key
    )
}

/// Format the ledger as a table
pub fn format_ledger_table(rows: &[LedgerRow]) -> String {
    if rows.is_empty() {
        return "No classifications recorded.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:13} {:10} {:34} {:20} {}\n",
        "State", "Date", "Category", "Counterparty", "Key"
    ));
    output.push_str(&"-".repeat(130));
    output.push('\n');

    for row in rows {
        output.push_str(&format_ledger_row(row));
        output.push('\n');
    }

    output.push_str(&"-".repeat(130));
    output.push('\n');
    let noun = if rows.len() == 1 {
        "classification"
    } else {
        "classifications"
    };
    output.push_str(&format!("{} {}\n", rows.len(), noun));

    output
}

/// Format ledger row details for display
pub fn format_ledger_row_details(row: &LedgerRow) -> String {
    let mut output = String::new();

    output.push_str(&format!("Classification: {}\n", row.key));
    output.push_str(&format!("  {:14}{}\n", "State:", row.state));
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
    if !row.source_path.is_empty() {
        output.push_str(&format!("  {:14}{}\n", "Source:", row.source_path));
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

    output
}

/// Non-empty catalog levels joined with `/`
fn category_path(row: &LedgerRow) -> String {
    [&row.category, &row.subtype, &row.account]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join("/")
}
