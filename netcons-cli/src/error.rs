use netcons_config::ConfigError;
use netcons_engine::engine::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
