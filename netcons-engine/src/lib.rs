//! # netcons-engine
//!
//! Worker state machine, pipeline facade and console hooks, plus the async
//! runtime entry points used by the CLI.

pub mod engine;
pub mod runtime;

pub use runtime::{forward_stream, run_forward_mode, run_trigger_mode, ForwardOptions};
