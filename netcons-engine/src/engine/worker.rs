//! Background worker: the single consumer of the console mailbox.
//!
//! The worker loops `WaitingForEvent -> Dispatching -> WaitingForEvent` until it
//! takes `Shutdown`, then reaches `Stopped` and hands its `NetworkSender` back
//! to whoever joins the thread so the socket is closed after the join.
use std::io;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use tracing::{debug, info, info_span, trace, warn};

use netcons_core::{Event, Mailbox, RingBuffer};
use netcons_telemetry::MetricsRecorder;
use netcons_transport::{NetworkSender, SendOutcome};

/// Mailbox carrying the console ring under its lock.
pub type ConsoleMailbox = Mailbox<RingBuffer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    WaitingForEvent = 0,
    Dispatching = 1,
    Stopped = 2,
}

/// Worker progress shared with the pipeline. Atomics only: the mailbox lock
/// stays the single lock of the data path.
#[derive(Debug, Default)]
pub struct WorkerStatus {
    state: AtomicU8,
    socket_ready: AtomicBool,
}

impl WorkerStatus {
    pub fn state(&self) -> WorkerState {
        match self.state.load(Ordering::Acquire) {
            0 => WorkerState::WaitingForEvent,
            1 => WorkerState::Dispatching,
            _ => WorkerState::Stopped,
        }
    }

    pub fn socket_ready(&self) -> bool {
        self.socket_ready.load(Ordering::Acquire)
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn set_socket_ready(&self, ready: bool) {
        self.socket_ready.store(ready, Ordering::Release);
    }
}

pub struct Worker {
    mailbox: Arc<ConsoleMailbox>,
    sender: NetworkSender,
    greeting: Bytes,
    chunk_size: usize,
    status: Arc<WorkerStatus>,
    metrics: Arc<MetricsRecorder>,
}

impl Worker {
    pub fn new(
        mailbox: Arc<ConsoleMailbox>,
        sender: NetworkSender,
        greeting: Bytes,
        chunk_size: usize,
        status: Arc<WorkerStatus>,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            mailbox,
            sender,
            greeting,
            chunk_size,
            status,
            metrics,
        }
    }

    /// Spawns the worker on a dedicated, named thread.
    pub fn spawn(self) -> io::Result<JoinHandle<NetworkSender>> {
        thread::Builder::new()
            .name("netcons-worker".into())
            .spawn(move || self.run())
    }

    /// Runs the event loop on the current thread until `Shutdown` is taken.
    pub fn run(mut self) -> NetworkSender {
        let destination = self.sender.destination().clone();
        let span = info_span!(
            "netcons_worker",
            destination = %destination.address,
            port = destination.port
        );
        let _guard = span.enter();
        info!("Worker started");

        loop {
            self.status.set_state(WorkerState::WaitingForEvent);
            let event = self.mailbox.wait_and_take();
            self.status.set_state(WorkerState::Dispatching);
            if self.dispatch(event).is_break() {
                break;
            }
        }

        self.status.set_state(WorkerState::Stopped);
        info!("Worker stopped");
        self.sender
    }

    fn dispatch(&mut self, event: Event) -> ControlFlow<()> {
        trace!(%event, "Dispatching event");
        self.metrics.record_dispatch();

        match event {
            Event::Ping => info!("netcons worker is alive and well"),
            Event::InitSocket => {
                info!("Initializing UDP socket");
                match self.sender.ensure_socket() {
                    Ok(()) => self.status.set_socket_ready(true),
                    Err(e) => warn!(error = %e, "Socket unavailable, console output will be dropped"),
                }
            }
            Event::SendHello => self.send(&self.greeting),
            Event::FlushBuffer => self.flush(),
            Event::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn flush(&self) {
        let chunk_size = self.chunk_size;
        let (chunk, remaining, overrun) = self.mailbox.with_attached(|ring| {
            let overrun = ring.is_overrun();
            let chunk = ring.drain_chunk(chunk_size);
            (chunk, ring.pending(), overrun)
        });

        if overrun {
            warn!("Console ring overrun, oldest unsent bytes were overwritten");
        }
        if chunk.is_empty() {
            return;
        }

        self.metrics.record_flush(chunk.len());
        self.send(&chunk);

        // One chunk per event; re-arm while bytes remain.
        if remaining > 0 {
            debug!(remaining, "Re-arming flush");
            self.mailbox.post_coalesced_flush();
        }
    }

    fn send(&self, payload: &[u8]) {
        match self.sender.send(payload) {
            Ok(SendOutcome::Sent(len)) => {
                trace!(len, "Datagram sent");
                self.metrics.record_sent(len);
            }
            Ok(SendOutcome::Skipped) => {}
            Err(e) => {
                self.metrics.record_send_failure();
                warn!(error = %e, "Dropping datagram");
            }
        }
    }
}
