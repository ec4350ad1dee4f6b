//! User settings for Facturero
//!
//! Manages the accounting drive location and the fiscal years the firm
//! currently keeps open for filing.

use chrono::Datelike;
use log::warn;
use serde::{Deserialize, Serialize};

use super::paths::FactureroPaths;
use crate::error::FactureroError;
use crate::models::key::InvoiceKey;

/// User settings for Facturero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Root of the accounting drive that receives classified evidence
    #[serde(default = "default_network_drive")]
    pub network_drive: String,

    /// Fiscal year used when a document key does not resolve to an open year
    #[serde(default = "default_fiscal_year")]
    pub fiscal_year: i32,

    /// Fiscal years accepted when resolving a year from a document key
    #[serde(default)]
    pub open_fiscal_years: Vec<i32>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_network_drive() -> String {
    "Z:/DATA".to_string()
}

fn default_fiscal_year() -> i32 {
    chrono::Local::now().year()
}

impl Default for Settings {
    fn default() -> Self {
        let fiscal_year = default_fiscal_year();
        Self {
            schema_version: default_schema_version(),
            network_drive: default_network_drive(),
            fiscal_year,
            open_fiscal_years: vec![fiscal_year],
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    ///
    /// An unreadable or unparseable settings file is renamed aside to
    /// `config.invalid.json` and defaults are returned. Settings problems
    /// must never stop a scan.
    pub fn load_or_create(paths: &FactureroPaths) -> Result<Self, FactureroError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let parsed = std::fs::read_to_string(&settings_path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_json::from_str::<Settings>(&contents).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(mut settings) => {
                settings.normalize();
                Ok(settings)
            }
            Err(reason) => {
                warn!(
                    "Settings file {} is invalid ({}); quarantining and using defaults",
                    settings_path.display(),
                    reason
                );
                let quarantine = settings_path.with_extension("invalid.json");
                if let Err(e) = std::fs::rename(&settings_path, &quarantine) {
                    warn!("Could not quarantine settings file: {}", e);
                }
                Ok(Settings::default())
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FactureroPaths) -> Result<(), FactureroError> {
        // Ensure the config directory exists
        paths.ensure_directories()?;

        let mut normalized = self.clone();
        normalized.normalize();

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(&normalized)
            .map_err(|e| FactureroError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| FactureroError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Bring loaded values back into their documented shape
    ///
    /// The active fiscal year is always open; open years are sorted and
    /// deduplicated; out-of-range years and empty drive strings fall back
    /// to defaults.
    pub fn normalize(&mut self) {
        if self.network_drive.trim().is_empty() {
            self.network_drive = default_network_drive();
        }
        if !(2000..2100).contains(&self.fiscal_year) {
            self.fiscal_year = default_fiscal_year();
        }
        self.open_fiscal_years.retain(|y| (2000..2100).contains(y));
        if !self.open_fiscal_years.contains(&self.fiscal_year) {
            self.open_fiscal_years.push(self.fiscal_year);
        }
        self.open_fiscal_years.sort_unstable();
        self.open_fiscal_years.dedup();
    }

    /// Resolve the fiscal year a document key belongs to
    ///
    /// The key's two-digit year segment maps to `2000 + yy`; the result is
    /// only trusted when that year is currently open. Callers fall back to
    /// the active `fiscal_year` on `None`.
    pub fn fiscal_year_for_key(&self, key: &InvoiceKey) -> Option<i32> {
        let year = 2000 + i32::from(key.year_two_digits());
        if self.open_fiscal_years.contains(&year) {
            Some(year)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(s: &str) -> InvoiceKey {
        InvoiceKey::parse(s).unwrap()
    }

    const KEY_2024: &str = "50614032400310112345600100001010000000011199999999";

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.network_drive, "Z:/DATA");
        assert!(settings.open_fiscal_years.contains(&settings.fiscal_year));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FactureroPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.network_drive = "/mnt/contabilidad".to_string();
        settings.fiscal_year = 2024;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.network_drive, "/mnt/contabilidad");
        assert_eq!(loaded.fiscal_year, 2024);
        assert!(loaded.open_fiscal_years.contains(&2024));
    }

    #[test]
    fn test_normalize_sorts_and_dedups_open_years() {
        let mut settings = Settings {
            schema_version: 1,
            network_drive: "  ".to_string(),
            fiscal_year: 2024,
            open_fiscal_years: vec![2025, 2024, 2025, 1815],
        };

        settings.normalize();

        assert_eq!(settings.network_drive, "Z:/DATA");
        assert_eq!(settings.open_fiscal_years, vec![2024, 2025]);
    }

    #[test]
    fn test_corrupt_settings_quarantined() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FactureroPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), "{not json").unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();

        assert_eq!(loaded.network_drive, "Z:/DATA");
        assert!(!paths.settings_file().exists());
        assert!(temp_dir.path().join("config.invalid.json").exists());
    }

    #[test]
    fn test_fiscal_year_for_key() {
        let mut settings = Settings::default();
        settings.fiscal_year = 2025;
        settings.open_fiscal_years = vec![2024, 2025];

        // Key year segment is "24"
        assert_eq!(settings.fiscal_year_for_key(&key(KEY_2024)), Some(2024));

        settings.open_fiscal_years = vec![2025];
        assert_eq!(settings.fiscal_year_for_key(&key(KEY_2024)), None);
    }
}
