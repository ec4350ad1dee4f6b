//! Custom error types for Facturero
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Facturero operations
#[derive(Error, Debug)]
pub enum FactureroError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for classification input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A document key that is not 50 numeric digits
    #[error("Invalid document key '{value}': {reason}")]
    InvalidKey { value: String, reason: String },

    /// Metadata document parse errors
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Copy verification failed: the destination digest differs from the source
    // `r#source` is the same identifier as `source`; the raw form keeps
    // thiserror from treating this path string as the error's source().
    #[error("SHA-256 verification failed copying '{source}' to '{destination}'")]
    HashMismatch {
        r#source: String,
        destination: String,
    },

    /// The source file could not be removed after a verified copy
    #[error("Could not remove source '{path}' after {attempts} attempts")]
    SourceDeletion { path: String, attempts: u32 },

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl FactureroError {
    /// Create a "not found" error for catalog categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for catalog subtypes
    pub fn subtype_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Subtype",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for catalog accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for invoice records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Record",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for ledger rows
    pub fn ledger_row_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Ledger row",
            identifier: identifier.into(),
        }
    }

    /// Create a duplicate error for catalog accounts
    pub fn account_duplicate(identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for FactureroError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FactureroError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Facturero operations
pub type FactureroResult<T> = Result<T, FactureroError>;
