//! Command-line interface parsing for the exchange-rate table manager
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a [`TableConfig`], plus the plain-text rendering of command results.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::TableConfig;
use crate::table::{DeleteReport, TableStatus, UpdateOutcome};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// A timeout of zero seconds would fail every request
    #[error("Invalid timeout: '{0}'. The timeout must be at least one second")]
    InvalidTimeout(u64),
}

/// cvtwd - Keep the TWD exchange-rate table up to date
#[derive(Parser, Debug)]
#[command(name = "cvtwd")]
#[command(about = "Download and manage TWD exchange-rate tables")]
#[command(version)]
pub struct Cli {
    /// Directory holding downloaded tables
    #[arg(long, global = true, value_name = "DIR")]
    pub table_dir: Option<PathBuf>,

    /// Endpoint publishing the latest table
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the latest table and install it if it is newer
    Update {
        /// Delete outdated tables afterwards
        #[arg(long)]
        clean: bool,
    },
    /// Delete outdated tables
    Cleanup {
        /// Re-read the table directory first, keeping only the newest table
        #[arg(long)]
        rescan: bool,
    },
    /// Show the active and outdated tables
    Status,
    /// Print the path of the active table, downloading one if none exists
    Path,
}

/// Builds the table configuration from the environment and CLI overrides
///
/// # Returns
/// * `Ok(TableConfig)` with CLI values taking precedence over `CVTWD_*` variables
/// * `Err(CliError::InvalidTimeout)` if `--timeout-secs 0` was given
pub fn table_config(cli: &Cli) -> Result<TableConfig, CliError> {
    let mut config = TableConfig::from_env();
    if let Some(dir) = &cli.table_dir {
        config = config.with_table_dir(dir.clone());
    }
    if let Some(url) = &cli.url {
        config = config.with_url(url.clone());
    }
    match cli.timeout_secs {
        Some(0) => return Err(CliError::InvalidTimeout(0)),
        Some(secs) => config = config.with_timeout(Duration::from_secs(secs)),
        None => {}
    }
    Ok(config)
}

pub fn format_update(outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::Installed { name, path } => {
            format!("Installed {} at {}", name, path.display())
        }
        UpdateOutcome::UpToDate { latest } => {
            format!("Existing table already up to date ({})", latest)
        }
        UpdateOutcome::Unavailable => {
            "No table could be fetched; check network connectivity and try again later".to_string()
        }
    }
}

pub fn format_cleanup(report: &DeleteReport) -> String {
    if report.deleted.is_empty() && report.already_missing.is_empty() && report.failed.is_empty() {
        return "No outdated tables detected".to_string();
    }

    let mut lines = Vec::new();
    for name in &report.deleted {
        lines.push(format!("Deleted {}", name));
    }
    for name in &report.already_missing {
        lines.push(format!("Already gone {}", name));
    }
    for (name, reason) in &report.failed {
        lines.push(format!("Failed to delete {}: {}", name, reason));
    }
    lines.join("\n")
}

pub fn format_status(status: &TableStatus) -> String {
    let mut lines = vec![format!("Table directory: {}", status.table_dir.display())];
    match &status.active {
        Some(active) => {
            let published = status
                .published_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            lines.push(format!("Active table:    {} (published {})", active, published));
        }
        None => lines.push("Active table:    none".to_string()),
    }
    if status.outdated.is_empty() {
        lines.push("Outdated tables: none".to_string());
    } else {
        lines.push(format!("Outdated tables: {}", status.outdated.len()));
        for name in &status.outdated {
            lines.push(format!("  {}", name));
        }
    }
    lines.join("\n")
}
