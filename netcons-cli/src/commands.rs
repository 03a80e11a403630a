use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use netcons_config::NetconsConfig;
use netcons_engine::{run_forward_mode, run_trigger_mode, ForwardOptions};
use netcons_telemetry::{EventLogger, MetricsRecorder};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "netcons", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forward stdin to the configured UDP destination until EOF or Ctrl-C
    Forward(ForwardArgs),
    /// Inject a single control event (1 ping, 2 init-socket, 3 send-hello, 4 flush)
    Trigger(TriggerArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ForwardArgs {
    /// Configuration file; defaults to config/netcons.yaml and NETCONS_* variables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Send the greeting datagram once the socket is up
    #[arg(long)]
    pub hello: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TriggerArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub code: i32,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<NetconsConfig, CliError> {
    let config = match path {
        Some(path) => NetconsConfig::load_from_path(path)?,
        None => NetconsConfig::load()?,
    };
    Ok(config)
}

pub async fn run_command(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.command {
        Commands::Forward(args) => load_config(args.config.as_deref())?,
        Commands::Trigger(args) => load_config(args.config.as_deref())?,
    };
    EventLogger::init(&config.telemetry.log_level);
    let metrics = Arc::new(MetricsRecorder::new()?);

    match cli.command {
        Commands::Forward(args) => {
            let options = ForwardOptions { hello: args.hello };
            run_forward_mode(config, options, Arc::clone(&metrics)).await?
        }
        Commands::Trigger(args) => {
            run_trigger_mode(config, args.code, Arc::clone(&metrics)).await?
        }
    }

    debug!(metrics = %metrics.gather_metrics()?, "Final counters");
    Ok(())
}
