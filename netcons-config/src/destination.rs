//! Remote listener configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Where console datagrams are sent.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    /// IP address of the remote listener.
    #[validate(custom(function = validation::validate_ip_address))]
    #[serde(default = "default_address")]
    pub address: String,

    /// UDP port of the remote listener.
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_address() -> String {
    "10.100.1.1".into()
}

fn default_port() -> u16 {
    6666
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}
