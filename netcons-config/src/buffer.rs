// netcons-config/src/buffer.rs
//! Console ring buffer sizing.
//!
//! Sizes accept plain byte counts or human-friendly strings ("16KiB").

use serde::{Deserialize, Deserializer, Serialize};
use validator::{self, Validate};

/// Console ring configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Ring capacity in bytes.
    #[validate(range(min = 64, max = 16777216))]
    #[serde(default = "default_capacity", deserialize_with = "deserialize_size")]
    pub capacity: usize,

    /// Largest payload drained per flush event (one datagram).
    #[validate(range(min = 1, max = 65507))]
    #[serde(default = "default_chunk_size", deserialize_with = "deserialize_size")]
    pub chunk_size: usize,
}

fn default_capacity() -> usize {
    16384
}

fn default_chunk_size() -> usize {
    4096
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Num(usize),
    Str(String),
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeValue::deserialize(deserializer)? {
        SizeValue::Num(n) => Ok(n),
        SizeValue::Str(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (num_part, unit_part) = s.split_at(split);
    let number: usize = num_part
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    let multiplier = match unit_part.trim().to_lowercase().as_str() {
        "" | "b" => 1,
        "kb" | "kib" => 1024,
        "mb" | "mib" => 1024 * 1024,
        other => return Err(format!("Unknown size unit '{other}'")),
    };
    number
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size '{s}' overflows"))
}
