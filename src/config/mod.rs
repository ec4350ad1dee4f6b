//! Configuration module for Facturero
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Period-root layout helpers
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::{FactureroPaths, PeriodPaths};
pub use settings::Settings;
