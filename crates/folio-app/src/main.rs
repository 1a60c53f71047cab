// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — turn an ordered set of raster images into a single multi-page PDF.
//
// Entry point. Initialises logging, parses the command line, and runs the
// selected command on the tokio runtime.

mod cli;
mod commands;
mod services;

use std::process::ExitCode;

use clap::Parser;
use folio_core::FolioError;
use folio_core::human_errors::humanize_error;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "Folio starting");

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Print an error in plain language, keeping the technical detail in the log.
fn report(err: &FolioError) {
    tracing::error!(error = %err, "command failed");
    let human = humanize_error(err);
    eprintln!("error: {}", human.message);
    eprintln!("       {}", human.suggestion);
    if human.retriable {
        eprintln!("       (trying again may help)");
    }
}
