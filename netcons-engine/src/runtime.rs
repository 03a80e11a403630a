//! Forwarder runtime: drives a pipeline from an async byte stream.
//!
//! The CLI streams stdin through the registered console's `putc`, exactly as a
//! host would deliver console output, and stops the pipeline on EOF or Ctrl-C.
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

use netcons_config::NetconsConfig;
use netcons_core::Event;
use netcons_telemetry::MetricsRecorder;

use crate::engine::{ControlInjector, LocalConsoleRegistry, Pipeline, PipelineError};

const IDLE_POLL: Duration = Duration::from_millis(1);
const DRAIN_GRACE: Duration = Duration::from_secs(2);
const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardOptions {
    /// Send the greeting datagram after the socket is initialized.
    pub hello: bool,
}

/// Forwards stdin until EOF or Ctrl-C.
pub async fn run_forward_mode(
    config: NetconsConfig,
    options: ForwardOptions,
    metrics: Arc<MetricsRecorder>,
) -> Result<(), PipelineError> {
    tokio::select! {
        result = forward_stream(config, options, tokio::io::stdin(), metrics) => {
            let forwarded = result?;
            info!(forwarded, "Input exhausted");
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping pipeline");
            Ok(())
        }
    }
}

/// Starts a pipeline, initializes the socket and injects one control event.
#[instrument(skip(config, metrics))]
pub async fn run_trigger_mode(
    config: NetconsConfig,
    code: i32,
    metrics: Arc<MetricsRecorder>,
) -> Result<(), PipelineError> {
    Event::from_control_code(code).map_err(|_| PipelineError::InvalidArgument(code))?;

    let registry = Arc::new(LocalConsoleRegistry::new());
    let mut pipeline = Pipeline::new(config, registry, metrics);
    pipeline.start()?;
    let injector = pipeline.injector().ok_or(PipelineError::NotStarted)?;

    if code != Event::InitSocket.code() {
        inject(&injector, Event::InitSocket.code()).await?;
    }
    inject(&injector, code).await?;
    settle(&pipeline).await;
    pipeline.stop()
}

/// Streams `input` through a freshly started pipeline. Returns the number of
/// bytes handed to the console.
pub async fn forward_stream<R>(
    config: NetconsConfig,
    options: ForwardOptions,
    mut input: R,
    metrics: Arc<MetricsRecorder>,
) -> Result<u64, PipelineError>
where
    R: AsyncRead + Unpin,
{
    let registry = Arc::new(LocalConsoleRegistry::new());
    let mut pipeline = Pipeline::new(config, registry.clone(), metrics);
    pipeline.start()?;
    let injector = pipeline.injector().ok_or(PipelineError::NotStarted)?;

    inject(&injector, Event::InitSocket.code()).await?;
    if options.hello {
        inject(&injector, Event::SendHello.code()).await?;
    }

    let mut buf = vec![0u8; READ_CHUNK];
    let mut forwarded = 0u64;
    loop {
        let n = input.read(&mut buf).await.map_err(PipelineError::Input)?;
        if n == 0 {
            break;
        }
        registry.write_bytes(&buf[..n]);
        forwarded += n as u64;
    }

    settle(&pipeline).await;
    pipeline.stop()?;
    Ok(forwarded)
}

/// Posts `code` once the mailbox holds no unconsumed command.
async fn inject(injector: &ControlInjector, code: i32) -> Result<(), PipelineError> {
    while !injector.is_idle() {
        sleep(IDLE_POLL).await;
    }
    debug!(code, "Injecting control event");
    injector.write(code)
}

/// Waits for queued events and buffered bytes to be handled before shutdown,
/// which otherwise takes priority over them.
async fn settle(pipeline: &Pipeline) {
    let drained = timeout(DRAIN_GRACE, async {
        while pipeline.pending_event().is_some() || pipeline.pending_bytes() > 0 {
            sleep(IDLE_POLL).await;
        }
    })
    .await;
    if drained.is_err() {
        warn!(
            pending = pipeline.pending_bytes(),
            "Pipeline did not drain before shutdown"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket;

    fn local_config() -> (UdpSocket, NetconsConfig) {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut config = NetconsConfig::default();
        config.destination.address = "127.0.0.1".into();
        config.destination.port = receiver.local_addr().unwrap().port();
        (receiver, config)
    }

    fn recv_until(receiver: &UdpSocket, expected_len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 8192];
        while out.len() < expected_len {
            let n = receiver.recv(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[tokio::test]
    async fn forwards_greeting_then_input() {
        let (receiver, config) = local_config();
        let greeting = config.console.greeting.clone();
        let metrics = Arc::new(MetricsRecorder::new().unwrap());

        let forwarded = forward_stream(
            config,
            ForwardOptions { hello: true },
            &b"Hi"[..],
            Arc::clone(&metrics),
        )
        .await
        .unwrap();
        assert_eq!(forwarded, 2);

        let mut buf = [0u8; 256];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], greeting.as_bytes());
        assert_eq!(recv_until(&receiver, 2), b"Hi");
        assert_eq!(metrics.bytes_sent.get(), (greeting.len() + 2) as u64);
    }

    #[tokio::test]
    async fn forwards_more_than_one_chunk() {
        let (receiver, config) = local_config();
        let input: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        let forwarded = forward_stream(
            config,
            ForwardOptions::default(),
            &input[..],
            Arc::new(MetricsRecorder::new().unwrap()),
        )
        .await
        .unwrap();
        assert_eq!(forwarded, input.len() as u64);
        assert_eq!(recv_until(&receiver, input.len()), input);
    }

    #[tokio::test]
    async fn trigger_rejects_out_of_range_code() {
        let (_receiver, config) = local_config();
        let err = run_trigger_mode(config, 99, Arc::new(MetricsRecorder::new().unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(99)));
    }

    #[tokio::test]
    async fn trigger_sends_hello() {
        let (receiver, config) = local_config();
        let greeting = config.console.greeting.clone();
        run_trigger_mode(
            config,
            Event::SendHello.code(),
            Arc::new(MetricsRecorder::new().unwrap()),
        )
        .await
        .unwrap();
        let mut buf = [0u8; 256];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], greeting.as_bytes());
    }
}
