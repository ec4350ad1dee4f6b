//! Classification ledger repository
//!
//! Manages loading and saving ledger rows to `clasificaciones.json` under
//! the period's `.metadata` directory. The file is a plain JSON object
//! keyed by document key, the shape earlier versions of the tooling wrote.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use log::warn;

use crate::error::FactureroError;
use crate::models::{InvoiceKey, LedgerRow};

use super::file_io::{read_json_or_quarantine, write_json_atomic};

/// Repository for classification ledger persistence
pub struct LedgerRepository {
    path: PathBuf,
    data: RwLock<HashMap<InvoiceKey, LedgerRow>>,
}

impl LedgerRepository {
    /// Create a new ledger repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load the ledger from disk
    ///
    /// A corrupt file is quarantined and the ledger starts empty. Rows
    /// that fail to parse individually are skipped with a warning rather
    /// than taking the rest of the ledger down with them. The legacy
    /// account-field migration runs on every loaded row.
    pub fn load(&self) -> Result<(), FactureroError> {
        let raw: HashMap<String, serde_json::Value> = read_json_or_quarantine(&self.path);

        let mut data = self.data.write().map_err(|e| {
            FactureroError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();

        for (file_key, value) in raw {
            match serde_json::from_value::<LedgerRow>(value) {
                Ok(mut row) => {
                    row.migrate_legacy();
                    data.insert(row.key.clone(), row);
                }
                Err(e) => {
                    warn!(
                        "Skipping unreadable ledger row '{}' in {}: {}",
                        file_key,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(())
    }

    /// Save the ledger to disk, key-sorted for stable diffs
    pub fn save(&self) -> Result<(), FactureroError> {
        let data = self.data.read().map_err(|e| {
            FactureroError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let sorted: BTreeMap<InvoiceKey, LedgerRow> =
            data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        write_json_atomic(&self.path, &sorted)
    }

    /// Insert or replace a row by key, then persist
    pub fn upsert(&self, row: LedgerRow) -> Result<(), FactureroError> {
        {
            let mut data = self.data.write().map_err(|e| {
                FactureroError::Storage(format!("Failed to acquire write lock: {}", e))
            })?;
            data.insert(row.key.clone(), row);
        }
        self.save()
    }

    /// Get a row by key
    pub fn get(&self, key: &InvoiceKey) -> Result<Option<LedgerRow>, FactureroError> {
        let data = self.data.read().map_err(|e| {
            FactureroError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(key).cloned())
    }

    /// Get the full ledger as a map
    ///
    /// Bulk cross-referencing (the registry overlay) works off this map
    /// instead of issuing one `get` per record.
    pub fn get_all(&self) -> Result<HashMap<InvoiceKey, LedgerRow>, FactureroError> {
        let data = self.data.read().map_err(|e| {
            FactureroError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.clone())
    }

    /// All rows sorted by key, for listings and exports
    pub fn rows_sorted(&self) -> Result<Vec<LedgerRow>, FactureroError> {
        let data = self.data.read().map_err(|e| {
            FactureroError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut rows: Vec<_> = data.values().cloned().collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    /// Remove a row, persisting when something was actually removed
    pub fn remove(&self, key: &InvoiceKey) -> Result<bool, FactureroError> {
        let removed = {
            let mut data = self.data.write().map_err(|e| {
                FactureroError::Storage(format!("Failed to acquire write lock: {}", e))
            })?;
            data.remove(key).is_some()
        };

        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Count rows
    pub fn count(&self) -> Result<usize, FactureroError> {
        let data = self.data.read().map_err(|e| {
            FactureroError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.len())
    }
}
