//! ## netcons-telemetry::metrics
//! **Prometheus counters for the datagram path**

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: prometheus::Registry,
    pub datagrams_sent: IntCounter,
    pub bytes_sent: IntCounter,
    pub send_failures: IntCounter,
    pub events_dispatched: IntCounter,
    pub flush_chunk_bytes: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let datagrams_sent =
            IntCounter::new("netcons_datagrams_sent_total", "Datagrams handed to the socket")?;
        let bytes_sent = IntCounter::new("netcons_bytes_sent_total", "Payload bytes sent")?;
        let send_failures =
            IntCounter::new("netcons_send_failures_total", "Datagram sends that failed")?;
        let events_dispatched =
            IntCounter::new("netcons_events_dispatched_total", "Mailbox events handled by the worker")?;

        let flush_chunk_bytes = Histogram::with_opts(
            HistogramOpts::new("netcons_flush_chunk_bytes", "Bytes drained per flush event")
                .buckets(vec![1.0, 16.0, 128.0, 1024.0, 4096.0]),
        )?;

        registry.register(Box::new(datagrams_sent.clone()))?;
        registry.register(Box::new(bytes_sent.clone()))?;
        registry.register(Box::new(send_failures.clone()))?;
        registry.register(Box::new(events_dispatched.clone()))?;
        registry.register(Box::new(flush_chunk_bytes.clone()))?;

        Ok(Self {
            registry,
            datagrams_sent,
            bytes_sent,
            send_failures,
            events_dispatched,
            flush_chunk_bytes,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn record_sent(&self, len: usize) {
        self.datagrams_sent.inc();
        self.bytes_sent.inc_by(len as u64);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.inc();
    }

    pub fn record_dispatch(&self) {
        self.events_dispatched.inc();
    }

    pub fn record_flush(&self, len: usize) {
        self.flush_chunk_bytes.observe(len as f64);
    }
}
