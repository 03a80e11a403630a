//! # netcons-core
//!
//! Foundation layer for the network console forwarder: the event codes exchanged
//! between producers and the worker, the fixed-capacity console ring, and the
//! single-slot mailbox that ties them together under one lock.
//!
//! ### Expectations:
//! - Producer paths never block beyond a short critical section
//! - At most one pending event, no lost wakeups
//! - Cursor arithmetic on 64-bit counters, never on wrapped indices
//!
//! ### Key Submodules:
//! - `event`: closed set of event codes and the administrative range
//! - `ring`: lossy byte ring with monotonic read/write cursors
//! - `mailbox`: mutex + condvar event slot with coalesced flush requests

pub mod error;
pub mod event;
pub mod mailbox;
pub mod ring;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::event::*;
    pub use crate::mailbox::*;
    pub use crate::ring::*;
}

pub use error::{EventError, MailboxError, RingError};
pub use event::Event;
pub use mailbox::Mailbox;
pub use ring::RingBuffer;
