//! Audit logger for the append-only audit trail
//!
//! Provides the AuditLogger struct that writes audit entries to a log
//! file. Each entry is written as a single JSON line and flushed
//! immediately.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{FactureroError, FactureroResult};

use super::entry::AuditEntry;

/// Handles writing audit entries to the audit trail file
///
/// The file uses a line-delimited JSON format (JSONL) where each line is
/// a complete JSON object representing one audit entry.
pub struct AuditLogger {
    /// Path to the audit trail file
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Log an audit entry
    ///
    /// Appends the entry as a JSON line to the audit trail file.
    /// Each write is flushed immediately to ensure durability.
    pub fn log(&self, entry: &AuditEntry) -> FactureroResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| FactureroError::Io(format!("Failed to open audit trail: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| FactureroError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| FactureroError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| FactureroError::Io(format!("Failed to flush audit trail: {}", e)))?;

        Ok(())
    }

    /// Log multiple audit entries in one pass
    ///
    /// Writes all entries and flushes once at the end.
    pub fn log_batch(&self, entries: &[AuditEntry]) -> FactureroResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| FactureroError::Io(format!("Failed to open audit trail: {}", e)))?;

        for entry in entries {
            let json = serde_json::to_string(entry).map_err(|e| {
                FactureroError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;

            writeln!(file, "{}", json)
                .map_err(|e| FactureroError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        file.flush()
            .map_err(|e| FactureroError::Io(format!("Failed to flush audit trail: {}", e)))?;

        Ok(())
    }

    /// Read all audit entries from the trail file
    ///
    /// Returns entries in chronological order (oldest first).
    pub fn read_all(&self) -> FactureroResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| FactureroError::Io(format!("Failed to open audit trail: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                FactureroError::Io(format!(
                    "Failed to read audit trail line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                FactureroError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries from the trail
    pub fn read_recent(&self, count: usize) -> FactureroResult<Vec<AuditEntry>> {
        let all_entries = self.read_all()?;
        let start = all_entries.len().saturating_sub(count);
        Ok(all_entries[start..].to_vec())
    }

    /// Get the number of entries in the audit trail
    pub fn entry_count(&self) -> FactureroResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| FactureroError::Io(format!("Failed to open audit trail: {}", e)))?;

        let reader = BufReader::new(file);
        let count = reader.lines().filter(|l| l.is_ok()).count();

        Ok(count)
    }

    /// Check if the audit trail file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the audit trail file
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}
