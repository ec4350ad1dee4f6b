//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure, plus
//! the quarantine-and-recover load used for state files that must never
//! stop a scan.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::FactureroError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, FactureroError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| {
        FactureroError::Storage(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        FactureroError::Storage(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Read JSON from a state file that must never stop the program
///
/// A missing file yields the default. An unreadable or unparseable file is
/// renamed aside to `<name>.invalid.json` so the next save starts clean,
/// and the default is returned. The quarantined file is left for manual
/// inspection.
pub fn read_json_or_quarantine<T, P>(path: P) -> T
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return T::default();
    }

    let parsed = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())
        });

    match parsed {
        Ok(value) => value,
        Err(reason) => {
            warn!(
                "State file {} is invalid ({}); quarantining and starting clean",
                path.display(),
                reason
            );
            let quarantine = path.with_extension("invalid.json");
            if let Err(e) = fs::rename(path, &quarantine) {
                warn!("Could not quarantine {}: {}", path.display(), e);
            }
            T::default()
        }
    }
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// This ensures that the file is either completely written or not modified at all,
/// preventing corruption on crashes or power failures.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), FactureroError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            FactureroError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Create temp file in same directory (important for atomic rename)
    let temp_path = path.with_extension("json.tmp");

    // Write to temp file
    let file = File::create(&temp_path)
        .map_err(|e| FactureroError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| FactureroError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| FactureroError::Storage(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| FactureroError::Storage(format!("Failed to sync data: {}", e)))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| {
        // Try to clean up temp file if rename fails
        let _ = fs::remove_file(&temp_path);
        FactureroError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Check if a JSON file exists and is valid
pub fn json_file_valid<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !path.exists() {
        return false;
    }

    // Try to parse as JSON
    if let Ok(file) = File::open(path) {
        let reader = BufReader::new(file);
        serde_json::from_reader::<_, serde_json::Value>(reader).is_ok()
    } else {
        false
    }
}
