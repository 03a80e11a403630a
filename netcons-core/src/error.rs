use thiserror::Error;

use crate::event::Event;

/// Rejections produced while decoding raw event codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("Event code {0} is not a known event")]
    UnknownCode(i32),

    #[error("Event code {0} is outside the administrative range 1..={max}", max = crate::event::MAX_CONTROL_EVENT)]
    OutOfRange(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    #[error("Ring buffer capacity must be non-zero")]
    ZeroCapacity,
}

/// Mailbox misuse and lifecycle errors.
///
/// `ContractViolation` is not recoverable: it means a caller posted a discrete
/// command while another one was still unconsumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MailboxError {
    #[error("Contract violation: event `{pending}` was unhandled when `{posted}` was posted")]
    ContractViolation { pending: Event, posted: Event },

    #[error("Mailbox is closed")]
    Closed,
}

impl MailboxError {
    /// Returns true for errors that must abort the pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MailboxError::ContractViolation { .. })
    }
}
