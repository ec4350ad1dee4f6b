//! Facturero - Electronic invoice reconciliation for Costa Rican accounting firms
//!
//! This library provides the core functionality for the Facturero CLI.
//! Each month an accounting firm receives Hacienda XML documents and the
//! printable evidence that backs them; Facturero pairs the two by their
//! 50-digit numeric key, tracks what is still missing, and files the
//! evidence for classified invoices into the shared accounting drive
//! under the firm's category taxonomy.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (keys, records, ledger rows, the catalog)
//! - `extract`: Metadata and evidence extraction from period directories
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `display`: Table and detail formatting for the CLI
//! - `export`: CSV and YAML exports
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use facturero::config::{paths::FactureroPaths, settings::Settings};
//!
//! let paths = FactureroPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod services;
pub mod storage;

pub use error::FactureroError;
