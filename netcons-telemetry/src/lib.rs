//! # Netcons Telemetry
//!
//! Crate for logging and metrics of the network console forwarder.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
