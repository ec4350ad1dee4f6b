//! Account catalog persistence
//!
//! The catalog lives in `catalogo_cuentas.json` under the period's
//! `.metadata` directory. Loading is self-healing: a missing file is
//! seeded with the built-in defaults, and a corrupt one is quarantined
//! aside before the defaults are written back. Catalog problems must
//! never stop classification work.

use std::path::PathBuf;

use crate::error::FactureroError;
use crate::models::Catalog;

use super::file_io::{read_json_or_quarantine, write_json_atomic};

/// Load/save access to a period's account catalog
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the catalog, seeding or healing the file as needed
    ///
    /// Missing file: the default catalog is written out and returned.
    /// Corrupt file: renamed to `catalogo_cuentas.invalid.json`, then the
    /// defaults are written out and returned. A valid file that omits
    /// baseline categories gets them merged back in and rewritten.
    pub fn load(&self) -> Result<Catalog, FactureroError> {
        let mut catalog: Catalog = read_json_or_quarantine(&self.path);

        let reasserted = catalog.merge_baseline();

        // Quarantine (or first touch) leaves no file behind; reseed it so
        // the operator always has something editable on disk.
        if reasserted || !self.path.exists() {
            self.save(&catalog)?;
        }

        Ok(catalog)
    }

    /// Save the catalog atomically
    pub fn save(&self, catalog: &Catalog) -> Result<(), FactureroError> {
        write_json_atomic(&self.path, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, CatalogStore) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalogo_cuentas.json");
        (temp_dir, CatalogStore::new(path))
    }

    #[test]
    fn test_missing_file_seeds_defaults() {
        let (temp_dir, store) = create_test_store();

        let catalog = store.load().unwrap();

        assert!(catalog.contains_category("GASTOS"));
        assert!(temp_dir.path().join("catalogo_cuentas.json").exists());
    }

    #[test]
    fn test_round_trip_preserves_edits() {
        let (_temp_dir, store) = create_test_store();

        let mut catalog = store.load().unwrap();
        catalog.insert_account("GASTOS", "GASTOS GENERALES", "AGUA");
        store.save(&catalog).unwrap();

        let reloaded = store.load().unwrap();
        assert!(reloaded.contains_account("GASTOS", "GASTOS GENERALES", "AGUA"));
    }

    #[test]
    fn test_corrupt_file_quarantined_and_reseeded() {
        let (temp_dir, store) = create_test_store();
        std::fs::write(temp_dir.path().join("catalogo_cuentas.json"), "][").unwrap();

        let catalog = store.load().unwrap();

        assert!(catalog.contains_category("INGRESOS"));
        assert!(temp_dir.path().join("catalogo_cuentas.invalid.json").exists());
        // The live file is reborn with the defaults
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, Catalog::default());
    }

    #[test]
    fn test_partial_file_gets_baseline_back() {
        let (temp_dir, store) = create_test_store();
        std::fs::write(
            temp_dir.path().join("catalogo_cuentas.json"),
            r#"{"GASTOS": {"GASTOS GENERALES": ["AGUA"]}}"#,
        )
        .unwrap();

        let catalog = store.load().unwrap();

        assert!(catalog.contains_account("GASTOS", "GASTOS GENERALES", "AGUA"));
        assert!(catalog.contains_category("COMPRAS"));
        // The completed tree is written back out
        let reloaded: Catalog =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(reloaded.contains_category("INGRESOS"));
        assert!(reloaded.contains_account("GASTOS", "GASTOS GENERALES", "AGUA"));
    }

    #[test]
    fn test_wrong_shape_is_quarantined() {
        let (temp_dir, store) = create_test_store();
        std::fs::write(
            temp_dir.path().join("catalogo_cuentas.json"),
            r#"["not", "a", "catalog"]"#,
        )
        .unwrap();

        let catalog = store.load().unwrap();

        assert_eq!(catalog, Catalog::default());
        assert!(temp_dir.path().join("catalogo_cuentas.invalid.json").exists());
    }
}
