//! Binary crate for the `weather-app` command-line host.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Invoking the core router for one request and printing the response

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cmd = cli::Cli::parse();
    logging::init(cmd.verbose, cmd.json_logs);
    cmd.run().await
}
