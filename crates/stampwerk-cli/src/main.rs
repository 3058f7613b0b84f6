// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stampwerk — purpose-bound watermarking for identity document copies.
//
// Entry point. Parses arguments, initialises logging, and runs the stamping
// pipeline once.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use stampwerk_core::StampIdentity;
use stampwerk_document::pipeline;

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Stampwerk starting");

    let output = args.output.clone();
    let result = args
        .into_job(StampIdentity::today())
        .and_then(|job| pipeline::run(&job));

    match result {
        Ok(report) => {
            tracing::info!(
                pages = report.pages,
                token = %report.token,
                font = %report.font,
                encrypted = report.encrypted,
                "Done"
            );
            println!("[OK] Wrote: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
