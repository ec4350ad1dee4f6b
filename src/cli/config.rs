//! Configuration CLI commands
//!
//! Shows and updates the shared settings: the accounting drive, the
//! active fiscal year, and the set of open fiscal years.

use clap::Subcommand;

use crate::config::paths::FactureroPaths;
use crate::config::settings::Settings;
use crate::error::{FactureroError, FactureroResult};

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Setting to change: drive, year, or open-years
        key: String,

        /// New value (open-years takes a comma-separated list)
        value: String,
    },
}

/// Handle configuration commands
pub fn handle_config_command(
    paths: &FactureroPaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> FactureroResult<()> {
    match cmd {
        ConfigCommands::Show => show_config(paths, settings),
        ConfigCommands::Set { key, value } => set_config(paths, settings, &key, &value),
    }
}

fn show_config(paths: &FactureroPaths, settings: &Settings) -> FactureroResult<()> {
    println!("Configuration file: {}", paths.settings_file().display());
    println!();
    println!("Accounting drive:  {}", settings.network_drive);
    println!("Fiscal year:       {}", settings.fiscal_year);
    println!(
        "Open fiscal years: {}",
        format_years(&settings.open_fiscal_years)
    );

    Ok(())
}

fn set_config(
    paths: &FactureroPaths,
    settings: &mut Settings,
    key: &str,
    value: &str,
) -> FactureroResult<()> {
    match key {
        "drive" => set_drive(paths, settings, value),
        "year" => set_year(paths, settings, value),
        "open-years" => set_open_years(paths, settings, value),
        other => Err(FactureroError::Validation(format!(
            "Unknown setting '{}'; valid keys are drive, year, open-years",
            other
        ))),
    }
}

fn set_drive(paths: &FactureroPaths, settings: &mut Settings, value: &str) -> FactureroResult<()> {
    let drive = value.trim();
    if drive.is_empty() {
        return Err(FactureroError::Validation(
            "Accounting drive cannot be empty".to_string(),
        ));
    }

    settings.network_drive = drive.to_string();
    settings.save(paths)?;

    println!("Accounting drive set to: {}", settings.network_drive);
    Ok(())
}

fn set_year(paths: &FactureroPaths, settings: &mut Settings, value: &str) -> FactureroResult<()> {
    settings.fiscal_year = parse_year(value)?;
    // The new active year joins the open set on save
    settings.normalize();
    settings.save(paths)?;

    println!("Fiscal year set to: {}", settings.fiscal_year);
    Ok(())
}

fn set_open_years(
    paths: &FactureroPaths,
    settings: &mut Settings,
    value: &str,
) -> FactureroResult<()> {
    settings.open_fiscal_years = parse_year_list(value)?;
    // Normalize before printing so the confirmation matches the file
    settings.normalize();
    settings.save(paths)?;

    println!(
        "Open fiscal years set to: {}",
        format_years(&settings.open_fiscal_years)
    );
    Ok(())
}

fn parse_year(raw: &str) -> FactureroResult<i32> {
    let trimmed = raw.trim();
    let year: i32 = trimmed
        .parse()
        .map_err(|_| FactureroError::Validation(format!("Invalid fiscal year '{}'", trimmed)))?;
    if !(2000..2100).contains(&year) {
        return Err(FactureroError::Validation(format!(
            "Fiscal year {} is out of range (2000-2099)",
            year
        )));
    }
    Ok(year)
}

fn parse_year_list(raw: &str) -> FactureroResult<Vec<i32>> {
    let years = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_year)
        .collect::<FactureroResult<Vec<i32>>>()?;

    if years.is_empty() {
        return Err(FactureroError::Validation(
            "At least one open fiscal year is required".to_string(),
        ));
    }
    Ok(years)
}

fn format_years(years: &[i32]) -> String {
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
