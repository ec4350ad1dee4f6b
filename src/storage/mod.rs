//! Storage layer for Facturero
//!
//! Provides JSON file storage with atomic writes, quarantine-based
//! recovery for corrupt state files, and automatic directory creation.
//! All engine state is scoped to one period root.

pub mod catalog;
pub mod file_io;
pub mod ledger;

pub use catalog::CatalogStore;
pub use file_io::{read_json, read_json_or_quarantine, write_json_atomic};
pub use ledger::LedgerRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::PeriodPaths;
use crate::error::FactureroError;

/// Storage coordinator for one period root
pub struct Storage {
    paths: PeriodPaths,
    pub ledger: LedgerRepository,
    pub catalog: CatalogStore,
    pub audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance for a period
    pub fn new(paths: PeriodPaths) -> Result<Self, FactureroError> {
        // Ensure the .metadata directory exists
        paths.ensure_metadata_dir()?;

        Ok(Self {
            ledger: LedgerRepository::new(paths.ledger_file()),
            catalog: CatalogStore::new(paths.catalog_file()),
            audit: AuditLogger::new(paths.audit_file()),
            paths,
        })
    }

    /// Get the period layout
    pub fn paths(&self) -> &PeriodPaths {
        &self.paths
    }

    /// Load all persistent state from disk
    pub fn load_all(&self) -> Result<(), FactureroError> {
        self.ledger.load()?;
        Ok(())
    }

    /// Record a create operation in the audit trail
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), FactureroError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update operation in the audit trail
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Result<(), FactureroError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        ))
    }

    /// Record a delete operation in the audit trail
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), FactureroError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}
