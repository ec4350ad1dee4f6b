//! Destination resolver
//!
//! Turns a record plus its classification choices into the canonical
//! folder under the accounting share. Pure path arithmetic; the move
//! executor owns every filesystem effect.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use crate::error::{FactureroError, FactureroResult};
use crate::extract::sanitize_folder_name;
use crate::models::{ClassificationChoices, InvoiceRecord};

/// Spanish month folder names, January first
pub const MONTH_FOLDERS: [&str; 12] = [
    "ENERO",
    "FEBRERO",
    "MARZO",
    "ABRIL",
    "MAYO",
    "JUNIO",
    "JULIO",
    "AGOSTO",
    "SEPTIEMBRE",
    "OCTUBRE",
    "NOVIEMBRE",
    "DICIEMBRE",
];

const FALLBACK_COUNTERPARTY: &str = "SIN PROVEEDOR";
const FALLBACK_SUBTYPE_GASTOS: &str = "GASTOS GENERALES";
const FALLBACK_ACCOUNT: &str = "SIN CUENTA";
const FALLBACK_SUBTYPE_OGND: &str = "OGND";

/// Everything outside the record that shapes a destination path
#[derive(Debug, Clone)]
pub struct DestinationContext {
    /// Accounting share root
    pub drive: PathBuf,
    /// Client display name, becomes a folder segment
    pub client_name: String,
    /// Already-resolved fiscal year for the `PF-` folder
    pub fiscal_year: i32,
    /// Date used when the record's issue date does not parse
    pub today: NaiveDate,
}

impl DestinationContext {
    pub fn new(
        drive: impl Into<PathBuf>,
        client_name: impl Into<String>,
        fiscal_year: i32,
        today: NaiveDate,
    ) -> Self {
        Self {
            drive: drive.into(),
            client_name: client_name.into(),
            fiscal_year,
            today,
        }
    }
}

/// Resolve the destination folder for a classified record
///
/// ```text
/// <drive>/PF-<year>/Contabilidades/<MONTH>/<CLIENT>/<subtree...>
/// ```
///
/// The month comes from the record's issue date and falls back to the
/// context date; a category outside COMPRAS, GASTOS and OGND is a
/// validation error because nothing else is ever filed.
pub fn resolve_destination(
    record: &InvoiceRecord,
    choices: &ClassificationChoices,
    ctx: &DestinationContext,
) -> FactureroResult<PathBuf> {
    let client = sanitize_folder_name(&ctx.client_name);
    if client.is_empty() {
        return Err(FactureroError::Validation(
            "Client name is required to build a destination".to_string(),
        ));
    }

    let mut path = ctx.drive.clone();
    path.push(format!("PF-{}", ctx.fiscal_year));
    path.push("Contabilidades");
    path.push(month_folder(record, ctx.today));
    path.push(client);
    for segment in category_subtree(record, choices)? {
        path.push(segment);
    }
    Ok(path)
}

/// Month bucket for a record, never fatal
fn month_folder(record: &InvoiceRecord, today: NaiveDate) -> &'static str {
    let month = record
        .parsed_issue_date()
        .map(|date| date.month())
        .unwrap_or_else(|| today.month());
    MONTH_FOLDERS[(month - 1) as usize]
}

fn category_subtree(
    record: &InvoiceRecord,
    choices: &ClassificationChoices,
) -> FactureroResult<Vec<String>> {
    let counterparty = || {
        let chosen = choices
            .counterparty
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(record.issuer_name.as_str());
        segment_or(chosen, FALLBACK_COUNTERPARTY)
    };
    // Taxonomy-side strings are upper-cased here so the resolver does not
    // depend on callers having normalized their input.
    let subtype = choices.subtype.as_deref().unwrap_or("").trim().to_uppercase();
    let account = choices.account.as_deref().unwrap_or("").trim().to_uppercase();

    match choices.category.trim().to_uppercase().as_str() {
        "COMPRAS" => Ok(vec!["COMPRAS".to_string(), counterparty()]),
        "GASTOS" => Ok(vec![
            "GASTOS".to_string(),
            segment_or(&subtype, FALLBACK_SUBTYPE_GASTOS),
            segment_or(&account, FALLBACK_ACCOUNT),
            counterparty(),
        ]),
        "OGND" => Ok(vec![
            "OGND".to_string(),
            segment_or(&subtype, FALLBACK_SUBTYPE_OGND),
        ]),
        _ => Err(FactureroError::Validation(format!(
            "Category '{}' cannot be filed; only COMPRAS, GASTOS and OGND have destinations",
            choices.category.trim()
        ))),
    }
}

/// Sanitize one operator-influenced segment, falling back when nothing
/// usable survives
fn segment_or(raw: &str, fallback: &str) -> String {
    let cleaned = sanitize_folder_name(raw);
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}
