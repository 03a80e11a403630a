// netcons-config/src/validation.rs
//! Custom validation functions for configuration.
//!
//! Provides shared validation logic used across multiple configuration modules.

use std::net::IpAddr;

use validator::ValidationError;

/// Validate that the destination is a literal IPv4 or IPv6 address.
pub fn validate_ip_address(address: &str) -> Result<(), ValidationError> {
    address
        .trim()
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_ip_address"))
}

/// Validate that a console name is short and alphanumeric, the way console
/// device names are registered.
pub fn validate_console_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty() && name.len() <= 15;

    let re =
        regex::Regex::new("^[a-zA-Z0-9_]+$").map_err(|_| ValidationError::new("invalid_regex"))?;

    if valid && re.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_console_name"))
    }
}

/// Validate the default log level directive.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error", "off"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ipv4_and_ipv6() {
        assert!(validate_ip_address("10.100.1.1").is_ok());
        assert!(validate_ip_address("::1").is_ok());
        assert!(validate_ip_address("10.100.1").is_err());
        assert!(validate_ip_address("loghost").is_err());
    }

    #[test]
    fn console_names() {
        assert!(validate_console_name("netconsole").is_ok());
        assert!(validate_console_name("net-console").is_err());
        assert!(validate_console_name("a_very_long_console_name").is_err());
        assert!(validate_console_name("").is_err());
    }
}
