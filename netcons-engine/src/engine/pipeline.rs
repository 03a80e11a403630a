//! Pipeline facade: wires ring, mailbox, worker and sender together.
//!
//! `start()` allocates the ring and mailbox, spawns the worker and registers the
//! console with the host. `stop()` posts `Shutdown`, joins the worker, closes
//! the socket and deregisters. Producers reach the pipeline through
//! [`ConsoleProducer`] and administrators through [`ControlInjector`]; both are
//! cheap handles onto the shared mailbox.
use std::sync::Arc;
use std::thread::JoinHandle;

use bytes::Bytes;
use tracing::{debug, error, info, instrument, warn};

use netcons_config::NetconsConfig;
use netcons_core::{Event, Mailbox, RingBuffer};
use netcons_telemetry::MetricsRecorder;
use netcons_transport::{Destination, NetworkSender};

use super::console::{ConsoleDescriptor, ConsoleDriver, ConsoleRegistry, NetConsole};
use super::error::PipelineError;
use super::worker::{ConsoleMailbox, Worker, WorkerState, WorkerStatus};

/// Character producer handle. Never blocks beyond the mailbox lock, never fails.
#[derive(Clone)]
pub struct ConsoleProducer {
    mailbox: Arc<ConsoleMailbox>,
}

impl ConsoleProducer {
    #[inline]
    pub fn on_character(&self, c: u8) {
        self.mailbox
            .post_coalesced_flush_with(|ring| ring.write_byte(c));
    }
}

/// Administrative trigger handle, modelled on a write-only integer knob.
#[derive(Clone)]
pub struct ControlInjector {
    mailbox: Arc<ConsoleMailbox>,
}

impl ControlInjector {
    /// Validates `code` against the administrative range and posts it.
    pub fn write(&self, code: i32) -> Result<(), PipelineError> {
        let event =
            Event::from_control_code(code).map_err(|_| PipelineError::InvalidArgument(code))?;
        self.mailbox.post(event).map_err(|e| {
            let err = PipelineError::from(e);
            if err.is_fatal() {
                error!(error = %err, "Control event rejected");
            }
            err
        })
    }

    /// The knob carries no persisted value.
    pub fn read(&self) -> i32 {
        0
    }

    /// True when a command can be posted without violating the mailbox contract.
    pub fn is_idle(&self) -> bool {
        matches!(self.mailbox.pending(), None | Some(Event::FlushBuffer))
    }
}

struct Running {
    mailbox: Arc<ConsoleMailbox>,
    worker: Option<JoinHandle<NetworkSender>>,
    status: Arc<WorkerStatus>,
    console_name: String,
    /// Only a console this pipeline added may be removed on teardown.
    registered: bool,
}

pub struct Pipeline {
    config: NetconsConfig,
    registry: Arc<dyn ConsoleRegistry>,
    metrics: Arc<MetricsRecorder>,
    running: Option<Running>,
}

impl Pipeline {
    pub fn new(
        config: NetconsConfig,
        registry: Arc<dyn ConsoleRegistry>,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            config,
            registry,
            metrics,
            running: None,
        }
    }

    pub fn config(&self) -> &NetconsConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    #[instrument(skip(self), fields(console = %self.config.console.name))]
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.running.is_some() {
            return Err(PipelineError::AlreadyStarted);
        }

        let ring = RingBuffer::new(self.config.buffer.capacity)?;
        let mailbox = Arc::new(Mailbox::new(ring));
        let status = Arc::new(WorkerStatus::default());

        let destination = Destination::new(
            self.config.destination.address.clone(),
            self.config.destination.port,
        );
        let worker = Worker::new(
            Arc::clone(&mailbox),
            NetworkSender::new(destination),
            Bytes::from(self.config.console.greeting.clone().into_bytes()),
            self.config.buffer.chunk_size,
            Arc::clone(&status),
            Arc::clone(&self.metrics),
        );
        let handle = worker.spawn().map_err(PipelineError::Spawn)?;

        let descriptor = ConsoleDescriptor::from(&self.config.console);
        let console_name = descriptor.name.clone();
        let console = Arc::new(NetConsole::new(
            descriptor,
            ConsoleProducer {
                mailbox: Arc::clone(&mailbox),
            },
        ));
        debug!(descriptor = ?console.probe(), "Console probed");
        let registered = match self.registry.add(console) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to add console");
                false
            }
        };

        self.running = Some(Running {
            mailbox,
            worker: Some(handle),
            status,
            console_name,
            registered,
        });
        info!(
            destination = %self.config.destination.address,
            port = self.config.destination.port,
            capacity = self.config.buffer.capacity,
            "Pipeline started"
        );
        Ok(())
    }

    /// Stops the worker and releases every resource. Safe to call repeatedly.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> Result<(), PipelineError> {
        let mut running = self.running.take().ok_or(PipelineError::NotStarted)?;
        self.teardown(&mut running)
    }

    fn teardown(&self, running: &mut Running) -> Result<(), PipelineError> {
        if let Err(e) = running.mailbox.post(Event::Shutdown) {
            debug!(error = %e, "Shutdown already posted");
        }

        let joined = running.worker.take().map(JoinHandle::join);
        let result = match joined {
            Some(Ok(mut sender)) => {
                sender.shutdown();
                Ok(())
            }
            Some(Err(_)) => {
                error!("Worker thread panicked");
                Err(PipelineError::WorkerPanicked)
            }
            None => Ok(()),
        };

        if running.registered {
            self.registry.remove(&running.console_name);
        }
        info!("Pipeline stopped");
        result
    }

    /// Producer entry point. Dropped silently when the pipeline is not running.
    #[inline]
    pub fn on_character(&self, c: u8) {
        if let Some(running) = &self.running {
            running
                .mailbox
                .post_coalesced_flush_with(|ring| ring.write_byte(c));
        }
    }

    /// Injector entry point: accepts `1..=4`, rejects anything else with
    /// `InvalidArgument` without touching the mailbox.
    pub fn on_control_event(&self, code: i32) -> Result<(), PipelineError> {
        Event::from_control_code(code).map_err(|_| PipelineError::InvalidArgument(code))?;
        self.injector().ok_or(PipelineError::NotStarted)?.write(code)
    }

    pub fn producer(&self) -> Option<ConsoleProducer> {
        self.running.as_ref().map(|running| ConsoleProducer {
            mailbox: Arc::clone(&running.mailbox),
        })
    }

    pub fn injector(&self) -> Option<ControlInjector> {
        self.running.as_ref().map(|running| ControlInjector {
            mailbox: Arc::clone(&running.mailbox),
        })
    }

    pub fn socket_ready(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| running.status.socket_ready())
    }

    pub fn worker_state(&self) -> WorkerState {
        self.running
            .as_ref()
            .map_or(WorkerState::Stopped, |running| running.status.state())
    }

    /// Console bytes written but not yet drained.
    pub fn pending_bytes(&self) -> u64 {
        self.running.as_ref().map_or(0, |running| {
            running.mailbox.with_attached(|ring| ring.pending())
        })
    }

    pub fn pending_event(&self) -> Option<Event> {
        self.running
            .as_ref()
            .and_then(|running| running.mailbox.pending())
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if let Some(mut running) = self.running.take() {
            let _ = self.teardown(&mut running);
        }
    }
}
