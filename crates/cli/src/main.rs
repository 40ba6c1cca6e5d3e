//! Wayguide - Main Entry Point

use std::process::ExitCode;

use clap::Parser;
use cli::{init_logging, print_report, run, Args};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("=== Wayguide v{} ===", env!("CARGO_PKG_VERSION"));

    let report = run(&args).await?;
    print_report(&report, args.json)?;

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("Session ended early: {:?}", report.outcome);
        Ok(ExitCode::FAILURE)
    }
}
