//! Audit trail for Facturero
//!
//! Records classification and catalog mutations with before/after values
//! in an append-only trail under the period's `.metadata` directory.
//!
//! # Architecture
//!
//! - `AuditEntry`: one operation on one entity, with timestamp and
//!   optional before/after values.
//! - `AuditLogger`: writes entries to the trail file using a
//!   line-delimited JSON format (JSONL).
//! - `generate_diff`: human-readable one-line diffs between entity
//!   states, recorded on updates.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
