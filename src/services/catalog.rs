//! Catalog service
//!
//! Curates the account taxonomy behind classification choices: validated
//! add/remove with audit trail entries, plus catalog access for listings.

use log::info;
use serde::Serialize;

use crate::audit::EntityType;
use crate::error::{FactureroError, FactureroResult};
use crate::models::Catalog;
use crate::storage::Storage;

/// Service for account catalog curation
pub struct CatalogService<'a> {
    storage: &'a Storage,
}

/// One account position in the taxonomy, as written to the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountEntry {
    pub categoria: String,
    pub subtipo: String,
    pub cuenta: String,
}

impl AccountEntry {
    /// Slash-joined identifier used for audit entity ids
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.categoria, self.subtipo, self.cuenta)
    }
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Load the catalog for read-only listings
    pub fn catalog(&self) -> FactureroResult<Catalog> {
        self.storage.catalog.load()
    }

    /// Add an account under a category/subtype pair
    ///
    /// Parts are trimmed and upper-cased; missing levels are created on
    /// the way down. An account already present under that subtype is a
    /// duplicate error.
    pub fn add_account(
        &self,
        category: &str,
        subtype: &str,
        account: &str,
    ) -> FactureroResult<AccountEntry> {
        let entry = normalized_entry(category, subtype, account)?;

        let mut catalog = self.storage.catalog.load()?;
        if !catalog.insert_account(&entry.categoria, &entry.subtipo, &entry.cuenta) {
            return Err(FactureroError::account_duplicate(entry.path()));
        }
        self.storage.catalog.save(&catalog)?;

        self.storage.log_create(
            EntityType::CatalogAccount,
            entry.path(),
            Some(entry.cuenta.clone()),
            &entry,
        )?;
        info!("catalog account added: {}", entry.path());

        Ok(entry)
    }

    /// Remove an account
    ///
    /// Emptied subtypes and categories stay in the tree. Missing levels
    /// surface as specific not-found errors.
    pub fn remove_account(
        &self,
        category: &str,
        subtype: &str,
        account: &str,
    ) -> FactureroResult<AccountEntry> {
        let entry = normalized_entry(category, subtype, account)?;

        let mut catalog = self.storage.catalog.load()?;
        if !catalog.contains_category(&entry.categoria) {
            return Err(FactureroError::category_not_found(&entry.categoria));
        }
        if !catalog.contains_subtype(&entry.categoria, &entry.subtipo) {
            return Err(FactureroError::subtype_not_found(format!(
                "{}/{}",
                entry.categoria, entry.subtipo
            )));
        }
        if !catalog.remove_account(&entry.categoria, &entry.subtipo, &entry.cuenta) {
            return Err(FactureroError::account_not_found(entry.path()));
        }
        self.storage.catalog.save(&catalog)?;

        self.storage.log_delete(
            EntityType::CatalogAccount,
            entry.path(),
            Some(entry.cuenta.clone()),
            &entry,
        )?;
        info!("catalog account removed: {}", entry.path());

        Ok(entry)
    }
}

fn normalized_entry(category: &str, subtype: &str, account: &str) -> FactureroResult<AccountEntry> {
    Ok(AccountEntry {
        categoria: normalized_part(category, "category")?,
        subtipo: normalized_part(subtype, "subtype")?,
        cuenta: normalized_part(account, "account")?,
    })
}

fn normalized_part(raw: &str, what: &str) -> FactureroResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FactureroError::Validation(format!(
            "Catalog {what} cannot be empty"
        )));
    }
    Ok(trimmed.to_uppercase())
}
