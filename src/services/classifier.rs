//! Classification service
//!
//! Orchestrates one classification end to end: ledger intent for records
//! without evidence, the verified move for records with evidence, and
//! audit trail entries for both.

use std::path::PathBuf;

use log::info;

use crate::audit::{generate_diff, EntityType};
use crate::error::FactureroResult;
use crate::models::{ClassificationChoices, InvoiceRecord, LedgerRow, RecordState};
use crate::storage::Storage;

use super::destination::{resolve_destination, DestinationContext};
use super::mover;

/// Service for classifying records into the accounting tree
pub struct Classifier<'a> {
    storage: &'a Storage,
    ctx: DestinationContext,
}

impl<'a> Classifier<'a> {
    /// Create a new classifier
    pub fn new(storage: &'a Storage, ctx: DestinationContext) -> Self {
        Self { storage, ctx }
    }

    /// Classify one record
    ///
    /// Returns the destination path when evidence was moved, `None` when
    /// the record has no evidence and only intent was recorded. The
    /// record is mutated only on a completed move.
    pub fn classify(
        &self,
        record: &mut InvoiceRecord,
        choices: &ClassificationChoices,
    ) -> FactureroResult<Option<PathBuf>> {
        let mut choices = choices.clone();
        choices.normalize();

        let Some(source) = record.evidence_path.clone() else {
            let row = LedgerRow::pending_evidence(record.key.clone(), &choices);
            self.upsert_with_audit(row)?;
            info!("recorded intent for {} (no evidence yet)", record.key);
            return Ok(None);
        };

        let dest_folder = resolve_destination(record, &choices, &self.ctx)?;
        let delivery = mover::deliver(&source, &dest_folder)?;

        let row = LedgerRow::classified(
            record.key.clone(),
            &choices,
            source.display().to_string(),
            delivery.destination.display().to_string(),
            delivery.sha256.clone(),
        );
        self.upsert_with_audit(row)?;

        record.evidence_path = Some(delivery.destination.clone());
        record.state = RecordState::Classified;

        info!(
            "classified {} -> {}",
            record.key,
            delivery.destination.display()
        );
        Ok(Some(delivery.destination))
    }

    /// Upsert a ledger row and record the change in the audit trail
    fn upsert_with_audit(&self, row: LedgerRow) -> FactureroResult<()> {
        let before = self.storage.ledger.get(&row.key)?;
        self.storage.ledger.upsert(row.clone())?;

        match before {
            Some(before) => {
                let diff = generate_diff(
                    &serde_json::to_value(&before)?,
                    &serde_json::to_value(&row)?,
                );
                self.storage.log_update(
                    EntityType::Classification,
                    row.key.to_string(),
                    Some(row.category.clone()),
                    &before,
                    &row,
                    diff,
                )
            }
            None => self.storage.log_create(
                EntityType::Classification,
                row.key.to_string(),
                Some(row.category.clone()),
                &row,
            ),
        }
    }
}
