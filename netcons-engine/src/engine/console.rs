//! Console driver hooks and the host-side registry they plug into.
//!
//! The host owns console registration; the forwarder only exposes a driver
//! (`probe`/`init`/`term`/`getc`/`putc`/`grab`/`ungrab`) and asks the registry
//! to add or remove it. `putc` is the character producer entry point.
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use netcons_config::{ConsoleConfig, ConsolePriority};
use netcons_telemetry::EventLogger;

use super::pipeline::ConsoleProducer;

/// What a console announces when probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleDescriptor {
    pub name: String,
    pub priority: ConsolePriority,
    /// The console must not be used by the kernel debugger.
    pub no_debug: bool,
}

impl From<&ConsoleConfig> for ConsoleDescriptor {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            name: config.name.clone(),
            priority: config.priority,
            no_debug: true,
        }
    }
}

pub trait ConsoleDriver: Send + Sync {
    fn probe(&self) -> ConsoleDescriptor;
    fn init(&self);
    fn term(&self);
    /// Reads one input character. Output-only consoles return `None`.
    fn getc(&self) -> Option<u8>;
    /// Writes one output character. Must not block or fail.
    fn putc(&self, c: u8);
    fn grab(&self);
    fn ungrab(&self);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Console '{0}' is already registered")]
    Duplicate(String),
}

/// Host registration collaborator.
pub trait ConsoleRegistry: Send + Sync {
    fn add(&self, console: Arc<dyn ConsoleDriver>) -> Result<(), RegistryError>;
    /// Removes the console named `name`. Returns whether it was registered.
    fn remove(&self, name: &str) -> bool;
}

/// The forwarding console: output goes to the pipeline, input is never offered.
pub struct NetConsole {
    descriptor: ConsoleDescriptor,
    producer: ConsoleProducer,
}

impl NetConsole {
    pub fn new(descriptor: ConsoleDescriptor, producer: ConsoleProducer) -> Self {
        Self {
            descriptor,
            producer,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl ConsoleDriver for NetConsole {
    fn probe(&self) -> ConsoleDescriptor {
        self.descriptor.clone()
    }

    fn init(&self) {
        EventLogger::log_console_hook(self.name(), "cninit");
    }

    fn term(&self) {
        EventLogger::log_console_hook(self.name(), "cnterm");
    }

    fn getc(&self) -> Option<u8> {
        EventLogger::log_console_hook(self.name(), "cngetc");
        None
    }

    #[inline]
    fn putc(&self, c: u8) {
        self.producer.on_character(c);
    }

    fn grab(&self) {
        EventLogger::log_console_hook(self.name(), "cngrab");
    }

    fn ungrab(&self) {
        EventLogger::log_console_hook(self.name(), "cnungrab");
    }
}

/// In-process registry: keeps registered consoles and fans output out to them.
#[derive(Default)]
pub struct LocalConsoleRegistry {
    consoles: Mutex<Vec<Arc<dyn ConsoleDriver>>>,
}

impl LocalConsoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        self.consoles
            .lock()
            .iter()
            .map(|console| console.probe().name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.consoles.lock().is_empty()
    }

    /// Writes `bytes` to every registered console, one `putc` per byte.
    pub fn write_bytes(&self, bytes: &[u8]) {
        // Snapshot so console callbacks never run under the registry lock.
        let consoles = self.consoles.lock().clone();
        for console in &consoles {
            for &b in bytes {
                console.putc(b);
            }
        }
    }
}

impl ConsoleRegistry for LocalConsoleRegistry {
    fn add(&self, console: Arc<dyn ConsoleDriver>) -> Result<(), RegistryError> {
        let descriptor = console.probe();
        {
            let mut consoles = self.consoles.lock();
            if consoles
                .iter()
                .any(|existing| existing.probe().name == descriptor.name)
            {
                return Err(RegistryError::Duplicate(descriptor.name));
            }
            consoles.push(Arc::clone(&console));
        }
        info!(
            console = %descriptor.name,
            priority = ?descriptor.priority,
            "Console registered"
        );
        console.init();
        Ok(())
    }

    fn remove(&self, name: &str) -> bool {
        let removed = {
            let mut consoles = self.consoles.lock();
            consoles
                .iter()
                .position(|console| console.probe().name == name)
                .map(|idx| consoles.remove(idx))
        };
        match removed {
            Some(console) => {
                console.term();
                info!(console = %name, "Console removed");
                true
            }
            None => {
                debug!(console = %name, "Console was not registered");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingConsole {
        chars: AtomicUsize,
        inits: AtomicUsize,
        terms: AtomicUsize,
    }

    impl ConsoleDriver for CountingConsole {
        fn probe(&self) -> ConsoleDescriptor {
            ConsoleDescriptor {
                name: "counting".into(),
                priority: ConsolePriority::Normal,
                no_debug: false,
            }
        }
        fn init(&self) {
            self.inits.fetch_add(1, Ordering::Relaxed);
        }
        fn term(&self) {
            self.terms.fetch_add(1, Ordering::Relaxed);
        }
        fn getc(&self) -> Option<u8> {
            None
        }
        fn putc(&self, _c: u8) {
            self.chars.fetch_add(1, Ordering::Relaxed);
        }
        fn grab(&self) {}
        fn ungrab(&self) {}
    }

    #[test]
    fn add_write_remove() {
        let registry = LocalConsoleRegistry::new();
        let console = Arc::new(CountingConsole::default());
        registry.add(console.clone()).unwrap();
        assert_eq!(console.inits.load(Ordering::Relaxed), 1);
        assert_eq!(registry.names(), vec!["counting".to_string()]);

        registry.write_bytes(b"hello");
        assert_eq!(console.chars.load(Ordering::Relaxed), 5);

        assert!(registry.remove("counting"));
        assert!(!registry.remove("counting"));
        assert_eq!(console.terms.load(Ordering::Relaxed), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_duplicate_names() {
        let registry = LocalConsoleRegistry::new();
        registry
            .add(Arc::new(CountingConsole::default()))
            .unwrap();
        assert_eq!(
            registry.add(Arc::new(CountingConsole::default())),
            Err(RegistryError::Duplicate("counting".into()))
        );
    }

    #[test]
    fn descriptor_from_config() {
        let descriptor = ConsoleDescriptor::from(&ConsoleConfig::default());
        assert_eq!(descriptor.name, "netconsole");
        assert_eq!(descriptor.priority, ConsolePriority::Remote);
        assert!(descriptor.no_debug);
    }
}
