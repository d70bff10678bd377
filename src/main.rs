//! jotty: an offline CLI for inspecting and validating JWTs.
//!
//! Entry point for the application. Parses CLI arguments, installs the
//! diagnostics subscriber, and delegates to the inspection handler.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod core;
mod display;
mod error;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::JottyError;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Parse CLI arguments and run the inspection.
///
/// Returns `ExitCode` so the caller can exit without `process::exit`,
/// allowing all destructors (including `Zeroizing`) to run.
fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    tracing::debug!(?cli, "parsed arguments");

    let verdict = commands::inspect::execute(&cli)?;
    Ok(if verdict.is_invalid() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Install a compact stderr subscriber. `RUST_LOG` overrides `--log-level`.
fn init_tracing(level: &str) -> Result<(), JottyError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| JottyError::LogFilter {
            reason: e.to_string(),
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .init();
    Ok(())
}
