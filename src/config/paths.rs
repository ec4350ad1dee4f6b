//! Path management for Facturero
//!
//! Provides XDG-compliant path resolution for the user-level configuration
//! (settings, account catalog) and the well-known layout of a period root.
//!
//! ## Path Resolution Order
//!
//! 1. `FACTURERO_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/facturero-cli` or `~/.config/facturero-cli`
//! 3. Windows: `%APPDATA%\facturero-cli`

use std::path::{Path, PathBuf};

use crate::error::FactureroError;

/// Manages the user-level paths used by Facturero
#[derive(Debug, Clone)]
pub struct FactureroPaths {
    /// Base directory for all Facturero configuration
    base_dir: PathBuf,
}

impl FactureroPaths {
    /// Create a new FactureroPaths instance
    ///
    /// Path resolution:
    /// 1. `FACTURERO_DATA_DIR` env var (explicit override)
    /// 2. Unix: `$XDG_CONFIG_HOME/facturero-cli` or `~/.config/facturero-cli`
    /// 3. Windows: `%APPDATA%\facturero-cli`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, FactureroError> {
        let base_dir = if let Ok(custom) = std::env::var("FACTURERO_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create FactureroPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/facturero-cli/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), FactureroError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| FactureroError::Io(format!("Failed to create base directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, FactureroError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
    Ok(config_base.join("facturero-cli"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, FactureroError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| FactureroError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("facturero-cli"))
}

/// Well-known layout under a period root
///
/// ```text
/// <root>/XML         metadata documents
/// <root>/PDF         evidence files
/// <root>/.metadata   ledger, audit log and scan reports
/// ```
#[derive(Debug, Clone)]
pub struct PeriodPaths {
    root: PathBuf,
}

impl PeriodPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The period root itself
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Subtree holding metadata documents
    pub fn xml_dir(&self) -> PathBuf {
        self.root.join("XML")
    }

    /// Subtree holding evidence files
    pub fn pdf_dir(&self) -> PathBuf {
        self.root.join("PDF")
    }

    /// Engine state directory
    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(".metadata")
    }

    /// Get the path to the classification ledger
    pub fn ledger_file(&self) -> PathBuf {
        self.metadata_dir().join("clasificaciones.json")
    }

    /// Get the path to the account catalog
    pub fn catalog_file(&self) -> PathBuf {
        self.metadata_dir().join("catalogo_cuentas.json")
    }

    /// Get the path to the audit trail
    pub fn audit_file(&self) -> PathBuf {
        self.metadata_dir().join("auditoria.jsonl")
    }

    /// Directory holding scan audit reports
    pub fn reports_dir(&self) -> PathBuf {
        self.metadata_dir().join("reports")
    }

    /// Ensure the engine state directories exist
    pub fn ensure_metadata_dir(&self) -> Result<(), FactureroError> {
        std::fs::create_dir_all(self.metadata_dir()).map_err(|e| {
            FactureroError::Io(format!("Failed to create .metadata directory: {}", e))
        })?;

        Ok(())
    }
}
