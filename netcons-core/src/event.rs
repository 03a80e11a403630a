//! ## netcons-core::event
//! **Event codes delivered through the mailbox**
//!
//! The integer codes are part of the control surface: an administrator writes
//! `1..=4` to trigger work, and `-1` is reserved for shutdown. The "no event"
//! code `0` never travels as a value; an empty mailbox slot stands in for it.

use std::fmt;

use crate::error::EventError;

/// Highest code accepted from the administrative control surface.
pub const MAX_CONTROL_EVENT: i32 = 4;

/// Work item handed from producers to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Emit a liveness log line.
    Ping,
    /// Create the datagram socket if it does not exist yet.
    InitSocket,
    /// Send the fixed greeting datagram.
    SendHello,
    /// Drain one chunk of pending console bytes and send it.
    FlushBuffer,
    /// Terminate the worker.
    Shutdown,
}

impl Event {
    pub const fn code(self) -> i32 {
        match self {
            Event::Ping => 1,
            Event::InitSocket => 2,
            Event::SendHello => 3,
            Event::FlushBuffer => 4,
            Event::Shutdown => -1,
        }
    }

    /// Decodes any known event code, including shutdown.
    pub fn from_code(code: i32) -> Result<Self, EventError> {
        match code {
            1 => Ok(Event::Ping),
            2 => Ok(Event::InitSocket),
            3 => Ok(Event::SendHello),
            4 => Ok(Event::FlushBuffer),
            -1 => Ok(Event::Shutdown),
            other => Err(EventError::UnknownCode(other)),
        }
    }

    /// Decodes a code written through the administrative control surface.
    ///
    /// Only `1..=MAX_CONTROL_EVENT` is accepted; shutdown is reserved for
    /// the pipeline itself.
    pub fn from_control_code(code: i32) -> Result<Self, EventError> {
        if !(1..=MAX_CONTROL_EVENT).contains(&code) {
            return Err(EventError::OutOfRange(code));
        }
        Self::from_code(code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Event::Ping => "ping",
            Event::InitSocket => "init-socket",
            Event::SendHello => "send-hello",
            Event::FlushBuffer => "flush-buffer",
            Event::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
