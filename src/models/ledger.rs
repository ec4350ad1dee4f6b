//! Classification ledger rows and operator input
//!
//! The ledger is the durable memory of what was filed where. Wire field
//! names are Spanish and fixed: files written by earlier versions of the
//! tooling must keep loading, and files we write must stay readable by
//! them. Schema evolution is strictly additive.

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::invoice::RecordState;
use super::key::InvoiceKey;

/// Operator name recorded when none is given
pub const DEFAULT_OPERATOR: &str = "local";

/// Operator input to a classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationChoices {
    /// Top-level category (COMPRAS, GASTOS, OGND, ...)
    pub category: String,
    /// Subtype under the category
    pub subtype: Option<String>,
    /// Account under the subtype
    pub account: Option<String>,
    /// Counterparty folder override (defaults to the issuer name)
    pub counterparty: Option<String>,
    /// Who classified; defaults to `local`
    pub operator: String,
}

impl ClassificationChoices {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subtype: None,
            account: None,
            counterparty: None,
            operator: DEFAULT_OPERATOR.to_string(),
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Trim everything; catalog levels are matched upper-case
    ///
    /// Optional fields that are empty after trimming count as absent. An
    /// empty operator falls back to [`DEFAULT_OPERATOR`].
    pub fn normalize(&mut self) {
        self.category = self.category.trim().to_uppercase();
        self.subtype = normalize_level(self.subtype.take());
        self.account = normalize_level(self.account.take());
        self.counterparty = self
            .counterparty
            .take()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let operator = self.operator.trim();
        self.operator = if operator.is_empty() {
            DEFAULT_OPERATOR.to_string()
        } else {
            operator.to_string()
        };
    }
}

fn normalize_level(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

/// One row of the classification ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// The 50-digit document key
    #[serde(rename = "clave_numerica")]
    pub key: InvoiceKey,

    /// `clasificado` once filed; `pendiente_pdf` when classified without evidence
    #[serde(rename = "estado")]
    pub state: RecordState,

    #[serde(rename = "categoria", default)]
    pub category: String,

    #[serde(rename = "subtipo", default)]
    pub subtype: String,

    #[serde(rename = "nombre_cuenta", default)]
    pub account: String,

    /// Account field as written by older versions; migrated into
    /// `nombre_cuenta` on load and preserved on save for old readers
    #[serde(rename = "subcategoria", default, skip_serializing_if = "String::is_empty")]
    pub legacy_account: String,

    #[serde(rename = "proveedor", default)]
    pub counterparty: String,

    #[serde(rename = "ruta_origen", default)]
    pub source_path: String,

    #[serde(rename = "ruta_destino", default)]
    pub destination_path: String,

    #[serde(rename = "sha256", default)]
    pub sha256: String,

    /// ISO-8601 timestamp with seconds precision
    #[serde(rename = "fecha_clasificacion", default)]
    pub classified_at: String,

    #[serde(rename = "clasificado_por", default = "default_operator")]
    pub operator: String,
}

fn default_operator() -> String {
    DEFAULT_OPERATOR.to_string()
}

impl LedgerRow {
    /// Row recording intent for a record that has no evidence file yet
    pub fn pending_evidence(key: InvoiceKey, choices: &ClassificationChoices) -> Self {
        Self {
            key,
            state: RecordState::PendingEvidence,
            category: choices.category.clone(),
            subtype: choices.subtype.clone().unwrap_or_default(),
            account: choices.account.clone().unwrap_or_default(),
            legacy_account: String::new(),
            counterparty: choices.counterparty.clone().unwrap_or_default(),
            source_path: String::new(),
            destination_path: String::new(),
            sha256: String::new(),
            classified_at: now_timestamp(),
            operator: choices.operator.clone(),
        }
    }

    /// Row recording a completed move
    pub fn classified(
        key: InvoiceKey,
        choices: &ClassificationChoices,
        source_path: impl Into<String>,
        destination_path: impl Into<String>,
        sha256: impl Into<String>,
    ) -> Self {
        Self {
            key,
            state: RecordState::Classified,
            category: choices.category.clone(),
            subtype: choices.subtype.clone().unwrap_or_default(),
            account: choices.account.clone().unwrap_or_default(),
            legacy_account: String::new(),
            counterparty: choices.counterparty.clone().unwrap_or_default(),
            source_path: source_path.into(),
            destination_path: destination_path.into(),
            sha256: sha256.into(),
            classified_at: now_timestamp(),
            operator: choices.operator.clone(),
        }
    }

    /// Apply the additive schema migration
    ///
    /// Older files carry the account under `subcategoria`; an empty
    /// `nombre_cuenta` takes that value. The legacy field itself is kept
    /// so files round-trip for old readers.
    pub fn migrate_legacy(&mut self) {
        if self.account.is_empty() && !self.legacy_account.is_empty() {
            self.account = self.legacy_account.clone();
        }
    }
}

fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
