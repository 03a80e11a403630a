//! ## netcons-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Diagnostics are emitted through the logging channel only; there is no
//! separate error-reporting path.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` overrides `default_directive`.
    pub fn init(default_directive: &str) {
        fmt()
            .with_env_filter(Self::filter(default_directive))
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .init()
    }

    fn filter(default_directive: &str) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
    }

    /// Records a console lifecycle hook invocation.
    #[inline]
    pub fn log_console_hook(console: &str, hook: &'static str) {
        tracing::info!(console, hook, "Console hook invoked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logging() {
        EventLogger::log_console_hook("netconsole", "cngrab");
        assert!(logs_contain("Console hook invoked"));
        assert!(logs_contain("cngrab"));
    }
}
