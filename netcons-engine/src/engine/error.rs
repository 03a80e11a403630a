use std::io;

use thiserror::Error;

use netcons_core::{Event, MailboxError, RingError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid control event code {0} (expected 1..={max})", max = netcons_core::event::MAX_CONTROL_EVENT)]
    InvalidArgument(i32),

    #[error("Pipeline is not started")]
    NotStarted,

    #[error("Pipeline is already started")]
    AlreadyStarted,

    #[error("Contract violation: event `{pending}` was unhandled when `{posted}` was posted")]
    ContractViolation { pending: Event, posted: Event },

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("Worker thread panicked")]
    WorkerPanicked,

    #[error("Ring buffer error: {0}")]
    Ring(#[from] RingError),

    #[error("Console input error: {0}")]
    Input(#[source] io::Error),
}

impl PipelineError {
    /// Errors after which the pipeline must not be used any further.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::ContractViolation { .. } | PipelineError::WorkerPanicked
        )
    }
}

impl From<MailboxError> for PipelineError {
    fn from(err: MailboxError) -> Self {
        match err {
            MailboxError::ContractViolation { pending, posted } => {
                PipelineError::ContractViolation { pending, posted }
            }
            MailboxError::Closed => PipelineError::NotStarted,
        }
    }
}
