//! ## netcons-core::mailbox
//! **Single-slot event mailbox with blocking consumption**
//!
//! The mailbox holds at most one unconsumed event. Producers post under a
//! short-held `parking_lot` mutex and wake the single consumer through a
//! condvar; the consumer blocks in [`Mailbox::wait_and_take`] until an event
//! is present.
//!
//! Two posting paths exist:
//! - [`Mailbox::post`] is strict. Posting while a discrete command is still
//!   pending is a [`MailboxError::ContractViolation`].
//! - [`Mailbox::post_coalesced_flush_with`] never fails. Repeated flush
//!   requests collapse into one pending `FlushBuffer`.
//!
//! A flush request that meets a pending command is parked in a deferred bit and
//! promoted into the slot once the command is taken, so neither is lost.
//! Shutdown is sticky and wins over anything else still pending.
//!
//! The mailbox also carries an attached value (the console ring in production)
//! guarded by the same lock, so event state and ring cursors are always
//! observed together.

use parking_lot::{Condvar, Mutex};

use crate::error::MailboxError;
use crate::event::Event;

struct Slot<T> {
    pending: Option<Event>,
    flush_deferred: bool,
    shutdown: bool,
    attached: T,
}

pub struct Mailbox<T = ()> {
    state: Mutex<Slot<T>>,
    wakeup: Condvar,
}

impl Default for Mailbox<()> {
    fn default() -> Self {
        Self::new(())
    }
}

impl<T> Mailbox<T> {
    pub fn new(attached: T) -> Self {
        Self {
            state: Mutex::new(Slot {
                pending: None,
                flush_deferred: false,
                shutdown: false,
                attached,
            }),
            wakeup: Condvar::new(),
        }
    }

    /// Posts a discrete event and wakes the consumer.
    ///
    /// Fails with `ContractViolation` if a command other than `FlushBuffer` is
    /// still unconsumed, and with `Closed` once shutdown has been posted.
    pub fn post(&self, event: Event) -> Result<(), MailboxError> {
        let mut state = self.state.lock();
        if state.shutdown {
            return Err(MailboxError::Closed);
        }

        if event == Event::Shutdown {
            state.shutdown = true;
            self.wakeup.notify_one();
            return Ok(());
        }

        match state.pending {
            None => {}
            Some(Event::FlushBuffer) => {
                if event != Event::FlushBuffer {
                    state.flush_deferred = true;
                }
            }
            Some(pending) => {
                return Err(MailboxError::ContractViolation {
                    pending,
                    posted: event,
                })
            }
        }

        state.pending = Some(event);
        self.wakeup.notify_one();
        Ok(())
    }

    /// Requests a buffer flush without any possibility of failure.
    pub fn post_coalesced_flush(&self) {
        self.post_coalesced_flush_with(|_| ());
    }

    /// Runs `f` against the attached value and requests a flush, all inside one
    /// critical section.
    pub fn post_coalesced_flush_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut state = self.state.lock();
        let out = f(&mut state.attached);
        match state.pending {
            None => state.pending = Some(Event::FlushBuffer),
            Some(Event::FlushBuffer) => {}
            Some(_) => state.flush_deferred = true,
        }
        self.wakeup.notify_one();
        out
    }

    /// Blocks until an event is available, then removes and returns it.
    pub fn wait_and_take(&self) -> Event {
        let mut state = self.state.lock();
        loop {
            if state.shutdown {
                return Event::Shutdown;
            }
            if let Some(event) = state.pending.take() {
                if state.flush_deferred {
                    state.flush_deferred = false;
                    state.pending = Some(Event::FlushBuffer);
                }
                return event;
            }
            self.wakeup.wait(&mut state);
        }
    }

    /// The event the consumer would receive next, if any.
    pub fn pending(&self) -> Option<Event> {
        let state = self.state.lock();
        if state.shutdown {
            Some(Event::Shutdown)
        } else {
            state.pending
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Runs `f` against the attached value under the mailbox lock.
    pub fn with_attached<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state.attached)
    }
}
