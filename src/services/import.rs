//! Legacy catalog import service
//!
//! Seeds the account taxonomy from the flat chart-of-accounts listing
//! exported by the previous accounting package: delimited rows of
//! `code|name|parent-code`. Parent codes map to fixed category/subtype
//! buckets; rows under unrecognized parents are counted, not imported.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};

use crate::audit::EntityType;
use crate::error::{FactureroError, FactureroResult};
use crate::storage::Storage;

use super::catalog::AccountEntry;

/// Options for reading a legacy listing
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field delimiter (the legacy export uses `|`)
    pub delimiter: char,
    /// Whether the first row is a header
    pub has_header: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: '|',
            has_header: true,
        }
    }
}

impl ImportOptions {
    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first row is a header
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }
}

/// A parsed account row from the legacy listing
#[derive(Debug, Clone)]
pub struct ParsedAccount {
    pub code: String,
    pub name: String,
    pub parent_code: String,
    /// Line in the source file, counting the header
    pub row_number: usize,
}

/// Result of a completed catalog import
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// Accounts added to the taxonomy
    pub added: usize,
    /// Accounts already present under their bucket
    pub duplicates: usize,
    /// Rows whose parent code has no bucket
    pub unknown_parents: usize,
    /// Messages for rows that could not be read
    pub errors: Vec<String>,
}

/// Service for importing the legacy account listing
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    /// Create a new import service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Import a legacy listing from a file on disk
    pub fn import_file(&self, path: &Path, options: &ImportOptions) -> FactureroResult<ImportSummary> {
        let file = File::open(path).map_err(|e| {
            FactureroError::Import(format!("Cannot open {}: {}", path.display(), e))
        })?;
        self.import_from_reader(BufReader::new(file), options)
    }

    /// Import a legacy listing from any reader
    pub fn import_from_reader<R: Read>(
        &self,
        reader: R,
        options: &ImportOptions,
    ) -> FactureroResult<ImportSummary> {
        if !options.delimiter.is_ascii() {
            return Err(FactureroError::Import(format!(
                "Delimiter '{}' must be a single ASCII character",
                options.delimiter
            )));
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter as u8)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let mut parsed = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            let row_number = idx + 1 + usize::from(options.has_header);
            match result {
                Ok(record) => parsed.push(parse_record(&record, row_number)),
                Err(e) => parsed.push(Err(format!("row {}: {}", row_number, e))),
            }
        }

        self.apply(parsed)
    }

    /// Fold parsed rows into the catalog and persist once
    fn apply(&self, parsed: Vec<Result<ParsedAccount, String>>) -> FactureroResult<ImportSummary> {
        let mut summary = ImportSummary::default();
        let mut catalog = self.storage.catalog.load()?;
        let mut added_entries = Vec::new();

        for row in parsed {
            let row = match row {
                Ok(row) => row,
                Err(message) => {
                    summary.errors.push(message);
                    continue;
                }
            };

            let Some((category, subtype)) = parent_bucket(&row.parent_code) else {
                debug!(
                    "row {}: no bucket for parent '{}' ({} {})",
                    row.row_number, row.parent_code, row.code, row.name
                );
                summary.unknown_parents += 1;
                continue;
            };

            let account = row.name.to_uppercase();
            if catalog.insert_account(category, subtype, &account) {
                summary.added += 1;
                added_entries.push(AccountEntry {
                    categoria: category.to_string(),
                    subtipo: subtype.to_string(),
                    cuenta: account,
                });
            } else {
                summary.duplicates += 1;
            }
        }

        if summary.added > 0 {
            self.storage.catalog.save(&catalog)?;
        }
        for entry in &added_entries {
            self.storage.log_create(
                EntityType::CatalogAccount,
                entry.path(),
                Some(entry.cuenta.clone()),
                entry,
            )?;
        }

        info!(
            "catalog import: {} added, {} duplicates, {} unknown parents, {} unreadable rows",
            summary.added,
            summary.duplicates,
            summary.unknown_parents,
            summary.errors.len()
        );
        Ok(summary)
    }
}

/// Fixed mapping from legacy parent codes to taxonomy buckets
///
/// The old chart keeps purchases under the 5-xx family and expenses
/// under 6-xx. Everything else (income, balance accounts) has no place
/// in the classification tree.
fn parent_bucket(parent_code: &str) -> Option<(&'static str, &'static str)> {
    match parent_code.trim() {
        "5-01" => Some(("COMPRAS", "COMPRAS DE CONTADO")),
        "5-02" => Some(("COMPRAS", "COMPRAS DE CREDITO")),
        "6-01" => Some(("GASTOS", "GASTOS GENERALES")),
        "6-02" => Some(("GASTOS", "GASTOS ESPECIFICOS")),
        _ => None,
    }
}

fn parse_record(record: &csv::StringRecord, row_number: usize) -> Result<ParsedAccount, String> {
    let field = |index: usize, what: &str| -> Result<String, String> {
        record
            .get(index)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| format!("row {}: missing {} column", row_number, what))
    };

    let code = field(0, "code")?;
    let name = field(1, "name")?;
    let parent_code = field(2, "parent code")?;
    if name.is_empty() {
        return Err(format!("row {}: empty account name", row_number));
    }

    Ok(ParsedAccount {
        code,
        name,
        parent_code,
        row_number,
    })
}
