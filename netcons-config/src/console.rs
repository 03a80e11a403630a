//! Console device registration parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Priority announced when the console is probed. Higher wins.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsolePriority {
    Dead,
    Low,
    Normal,
    Internal,
    #[default]
    Remote,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Name the console registers under.
    #[validate(custom(function = validation::validate_console_name))]
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub priority: ConsolePriority,

    /// Payload of the `SendHello` datagram.
    #[validate(length(min = 1, max = 1024))]
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_name() -> String {
    "netconsole".into()
}

fn default_greeting() -> String {
    "HELLO FROM NETCONS\n".into()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            priority: ConsolePriority::default(),
            greeting: default_greeting(),
        }
    }
}
