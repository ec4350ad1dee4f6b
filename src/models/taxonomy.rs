//! Account catalog model
//!
//! The taxonomy operators classify against: category, subtype, account.
//! Serialized as plain nested JSON objects so the file stays hand-editable
//! and diffable (`{"GASTOS": {"GASTOS GENERALES": ["ELECTRICIDAD"]}}`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hierarchical account catalog: category → subtype → account names
///
/// `BTreeMap` keeps serialization key-sorted, matching files written by
/// earlier versions of the tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl Default for Catalog {
    /// The built-in catalog
    ///
    /// Guarantees a baseline of classification choices even before any
    /// catalog has been imported or curated.
    fn default() -> Self {
        let mut tree: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();

        tree.insert(
            "INGRESOS".into(),
            [
                ("FACTURAS ELECTRONICAS".to_string(), Vec::new()),
                ("TIQUETES ELECTRONICOS".to_string(), Vec::new()),
            ]
            .into_iter()
            .collect(),
        );
        tree.insert(
            "COMPRAS".into(),
            [
                ("COMPRAS DE CONTADO".to_string(), Vec::new()),
                ("COMPRAS DE CREDITO".to_string(), Vec::new()),
            ]
            .into_iter()
            .collect(),
        );
        tree.insert(
            "GASTOS".into(),
            [
                (
                    "GASTOS ESPECIFICOS".to_string(),
                    vec!["ALQUILER".to_string(), "HONORARIOS PROFESIONALES".to_string()],
                ),
                (
                    "GASTOS GENERALES".to_string(),
                    vec![
                        "ELECTRICIDAD".to_string(),
                        "PAPELERIA Y UTILES DE OFICINA".to_string(),
                    ],
                ),
            ]
            .into_iter()
            .collect(),
        );
        tree.insert(
            "OGND".into(),
            ["OGND", "DNR", "ORS", "CNR"]
                .into_iter()
                .map(|s| (s.to_string(), vec![s.to_string()]))
                .collect(),
        );

        Self(tree)
    }
}

impl Catalog {
    /// An empty catalog (imports start from here)
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Category names, sorted
    pub fn categories(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Subtype names under a category, sorted
    pub fn subtypes(&self, category: &str) -> Vec<&str> {
        self.0
            .get(category)
            .map(|subs| subs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Account names under a subtype, sorted
    pub fn accounts(&self, category: &str, subtype: &str) -> Vec<&str> {
        let mut accounts: Vec<&str> = self
            .0
            .get(category)
            .and_then(|subs| subs.get(subtype))
            .map(|accs| accs.iter().map(String::as_str).collect())
            .unwrap_or_default();
        accounts.sort_unstable();
        accounts
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    pub fn contains_subtype(&self, category: &str, subtype: &str) -> bool {
        self.0
            .get(category)
            .is_some_and(|subs| subs.contains_key(subtype))
    }

    pub fn contains_account(&self, category: &str, subtype: &str, account: &str) -> bool {
        self.0
            .get(category)
            .and_then(|subs| subs.get(subtype))
            .is_some_and(|accs| accs.iter().any(|a| a == account))
    }

    /// Insert an account, creating the category and subtype levels as needed
    ///
    /// Returns `false` when the account already exists under that subtype.
    pub fn insert_account(&mut self, category: &str, subtype: &str, account: &str) -> bool {
        let accounts = self
            .0
            .entry(category.to_string())
            .or_default()
            .entry(subtype.to_string())
            .or_default();

        if accounts.iter().any(|a| a == account) {
            return false;
        }
        accounts.push(account.to_string());
        true
    }

    /// Remove an account; empty subtypes and categories are retained
    ///
    /// Returns `false` when the account was not present.
    pub fn remove_account(&mut self, category: &str, subtype: &str, account: &str) -> bool {
        let Some(accounts) = self.0.get_mut(category).and_then(|subs| subs.get_mut(subtype))
        else {
            return false;
        };
        let before = accounts.len();
        accounts.retain(|a| a != account);
        accounts.len() != before
    }

    /// Total number of accounts across the tree
    pub fn account_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|subs| subs.values())
            .map(Vec::len)
            .sum()
    }

    /// Re-assert the built-in baseline, adding whatever levels are missing
    ///
    /// A hand-edited or legacy-imported file may omit baseline categories;
    /// classification choices must stay available regardless. Returns `true`
    /// when anything was added.
    pub fn merge_baseline(&mut self) -> bool {
        let mut changed = false;
        for (category, subtypes) in Self::default().0 {
            let existing_subtypes = self.0.entry(category).or_insert_with(|| {
                changed = true;
                BTreeMap::new()
            });
            for (subtype, accounts) in subtypes {
                let existing_accounts = existing_subtypes.entry(subtype).or_insert_with(|| {
                    changed = true;
                    Vec::new()
                });
                for account in accounts {
                    if !existing_accounts.iter().any(|a| *a == account) {
                        existing_accounts.push(account);
                        changed = true;
                    }
                }
            }
        }
        changed
    }
}
