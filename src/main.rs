//! cvtwd - Keep a local copy of the TWD exchange-rate table
//!
//! Downloads the table published by the Bank of Taiwan, keeps the newest
//! one active and purges superseded copies on request.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use cvtwd::cli::{self, Cli, Command};
use cvtwd::table::TableManager;

/// Prints `value` as pretty JSON or as the given plain-text rendering
fn emit<T: Serialize>(json: bool, value: &T, text: String) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}

async fn run(args: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli::table_config(&args)?;
    let mut manager = TableManager::new(config)?;

    match args.command {
        Command::Update { clean } => {
            let outcome = manager.update(clean).await?;
            emit(args.json, &outcome, cli::format_update(&outcome))?;
        }
        Command::Cleanup { rescan } => {
            let report = if rescan {
                manager.rescan_and_cleanup()?
            } else {
                manager.cleanup()?
            };
            emit(args.json, &report, cli::format_cleanup(&report))?;
            if !report.is_clean() {
                return Err(format!("{} outdated table(s) could not be deleted", report.failed.len()).into());
            }
        }
        Command::Status => {
            let status = manager.status();
            emit(args.json, &status, cli::format_status(&status))?;
        }
        Command::Path => {
            let path = manager.ensure_table().await?;
            emit(args.json, &path, path.display().to_string())?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
