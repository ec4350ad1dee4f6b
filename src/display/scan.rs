//! Scan result display formatting
//!
//! Formats scan statistics and the omission table the `scan` command
//! prints after walking a period.

use crate::models::Omission;
use crate::services::ScanStats;

/// Format scan counters for display
pub fn format_scan_summary(stats: &ScanStats) -> String {
    let mut output = String::new();

    output.push_str("Scan summary\n");
    output.push_str(&format!(
        "  {:20}{}\n",
        "Metadata documents:", stats.metadata_documents
    ));
    if stats.metadata_errors > 0 {
        output.push_str(&format!("  {:20}{}\n", "Metadata errors:", stats.metadata_errors));
    }
    output.push_str(&format!("  {:20}{}\n", "Evidence files:", stats.evidence_files));
    output.push_str(&format!("  {:20}{}\n", "Linked:", stats.linked));
    output.push_str(&format!("  {:20}{}\n", "Synthesized:", stats.synthesized));

    output.push_str(&format!("  {:20}{}\n", "Omitted:", stats.omitted()));
    let reasons = [
        ("not an invoice:", stats.omitted_not_invoice),
        ("scan timed out:", stats.omitted_timeout),
        ("no key found:", stats.omitted_extraction_failure),
        ("unreadable file:", stats.omitted_corrupted),
    ];
    for (label, count) in reasons {
        if count > 0 {
            output.push_str(&format!("    {:18}{}\n", label, count));
        }
    }

    output.push_str(&format!("  {:20}{} ms\n", "Duration:", stats.duration_ms));

    output
}

/// Format the omission table
///
/// Every evidence file a scan left out of the registry, with the reason
/// and whatever context the extractor attached.
pub fn format_omissions(omissions: &[Omission]) -> String {
    if omissions.is_empty() {
        return "No files were omitted.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{:16}{}\n", "Reason", "File"));
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for omission in omissions {
        let detail = if omission.detail.is_empty() {
            String::new()
        } else {
            format!(" ({})", omission.detail)
        };
        output.push_str(&format!(
            "{:16}{}{}\n",
            omission.reason.to_string(),
            omission.path.display(),
            detail
        ));
    }

    output.push_str(&"-".repeat(70));
    output.push('\n');
    let noun = if omissions.len() == 1 { "file" } else { "files" };
    output.push_str(&format!("{} {} omitted\n", omissions.len(), noun));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OmissionReason;

    #[test]
    fn test_format_scan_summary() {
        let stats = ScanStats {
            metadata_documents: 120,
            metadata_errors: 0,
            evidence_files: 118,
            linked: 110,
            synthesized: 6,
            omitted_not_invoice: 2,
            omitted_timeout: 0,
            omitted_extraction_failure: 0,
            omitted_corrupted: 0,
            duration_ms: 412,
        };

        let formatted = format_scan_summary(&stats);
        assert!(formatted.contains("Metadata documents: 120"));
        assert!(formatted.contains("Omitted:            2"));
        assert!(formatted.contains("not an invoice:"));
        assert!(!formatted.contains("Metadata errors"));
        assert!(!formatted.contains("scan timed out"));
        assert!(formatted.contains("412 ms"));
    }

    #[test]
    fn test_format_no_omissions() {
        let formatted = format_omissions(&[]);
        assert!(formatted.contains("No files were omitted"));
    }

    #[test]
    fn test_format_omission_table() {
        let omissions = vec![
            Omission::new(
                "/period/PDF/estado de cuenta marzo.pdf",
                OmissionReason::NotInvoice,
                "",
            ),
            Omission::new(
                "/period/PDF/scan_0042.pdf",
                OmissionReason::ExtractionFailure,
                "2 candidate keys in raw bytes",
            ),
        ];

        let formatted = format_omissions(&omissions);
        assert!(formatted.contains("not an invoice"));
        assert!(formatted.contains("estado de cuenta marzo.pdf"));
        assert!(formatted.contains("(2 candidate keys in raw bytes)"));
        assert!(formatted.contains("2 files omitted"));
    }
}
