//! ## netcons-cli
//! **Network console forwarder**
//!
//! Streams stdin through the console pipeline to a UDP collector, or injects
//! single control events for diagnostics.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("netcons: {e}");
            ExitCode::FAILURE
        }
    }
}
