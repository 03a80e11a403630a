//! # Netcons Configuration System
//!
//! Hierarchical configuration for the network console forwarder.
//!
//! ## Features
//! - **Unified Configuration**: one tree for destination, ring, console and telemetry
//! - **Validation**: every loaded tree is checked with `validator` before use
//! - **Environment Awareness**: per-environment YAML overrides and `NETCONS_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod buffer;
mod console;
mod destination;
mod error;
mod telemetry;
mod validation;

pub use buffer::BufferConfig;
pub use console::{ConsoleConfig, ConsolePriority};
pub use destination::DestinationConfig;
pub use error::ConfigError;
pub use telemetry::TelemetryConfig;

/// Base configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/netcons.yaml";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq, Eq)]
pub struct NetconsConfig {
    /// Remote listener address and port.
    #[validate(nested)]
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Console ring sizing.
    #[validate(nested)]
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Console registration parameters and greeting payload.
    #[validate(nested)]
    #[serde(default)]
    pub console: ConsoleConfig,

    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl NetconsConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/netcons.yaml`, if present
    /// 3. `config/<NETCONS_ENV>.yaml`, if present
    /// 4. `NETCONS_*` environment variables (`__` separates nested keys)
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(NetconsConfig::default()));

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_FILE));
        }

        if let Ok(env) = std::env::var("NETCONS_ENV") {
            let env_file = format!("config/{}.yaml", env);
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        Self::extract_validated(figment.merge(Self::env_provider()))
    }

    /// Load configuration from a specific file, with environment overrides on top.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment = Figment::from(Serialized::defaults(NetconsConfig::default()))
            .merge(Yaml::file(path))
            .merge(Self::env_provider());
        Self::extract_validated(figment)
    }

    fn env_provider() -> Env {
        // NETCONS_ENV selects the overlay file, it is not a key.
        Env::prefixed("NETCONS_").ignore(&["ENV"]).split("__")
    }

    fn extract_validated(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn default_config_validates() {
        let config = NetconsConfig::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config.destination.address, "10.100.1.1");
        assert_eq!(config.destination.port, 6666);
        assert_eq!(config.buffer.capacity, 16384);
        assert_eq!(config.buffer.chunk_size, 4096);
        assert_eq!(config.console.priority, ConsolePriority::Remote);
    }

    #[test]
    fn yaml_and_environment_override() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/netcons.yaml",
                r#"
destination:
  address: "127.0.0.1"
  port: 7777
buffer:
  capacity: "32KiB"
"#,
            )?;
            jail.set_env("NETCONS_DESTINATION__PORT", "9999");

            let config = NetconsConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.destination.address, "127.0.0.1");
            assert_eq!(config.destination.port, 9999);
            assert_eq!(config.buffer.capacity, 32 * 1024);
            assert_eq!(config.buffer.chunk_size, 4096);
            Ok(())
        });
    }

    #[test]
    fn environment_overlay_file() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/lab.yaml", "console:\n  greeting: \"lab\\n\"\n")?;
            jail.set_env("NETCONS_ENV", "lab");

            let config = NetconsConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.console.greeting, "lab\n");
            Ok(())
        });
    }

    #[test]
    fn rejects_invalid_destination() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "destination:\n  address: \"not-an-ip\"\n")?;
            match NetconsConfig::load_from_path("bad.yaml") {
                Err(ConfigError::Validation(errors)) => {
                    let rendered = ConfigError::Validation(errors).to_string();
                    assert!(rendered.contains("destination.address"), "{rendered}");
                }
                other => panic!("expected validation error, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            NetconsConfig::load_from_path("does/not/exist.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
