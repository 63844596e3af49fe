//! Configuration schema definitions.
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! changes.

use super::error::{ConfigError, ConfigResult};
use crate::port::PortIdentifier;
use crate::reader::{ReaderSettings, DEFAULT_CHUNK_SIZE};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial port configuration
    pub serial: SerialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check values that would make a session unusable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.default_baud == 0 {
            return Err(ConfigError::invalid("serial.default_baud", "must be positive"));
        }
        if self.serial.timeout_ms == 0 {
            return Err(ConfigError::invalid("serial.timeout_ms", "must be positive"));
        }
        if self.serial.chunk_size == 0 {
            return Err(ConfigError::invalid("serial.chunk_size", "must be positive"));
        }
        Ok(())
    }
}

/// Serial port configuration section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate when none is given on open
    pub default_baud: u32,
    /// Read/write timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum bytes per read
    pub chunk_size: usize,
    /// Pause after a failed read, in milliseconds
    pub read_backoff_ms: u64,
    /// Discard driver buffers on open
    pub clear_on_open: bool,
    /// Port aliases for convenience
    #[serde(default)]
    pub port_aliases: HashMap<String, String>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            default_baud: 9600,
            timeout_ms: 50,
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_backoff_ms: 10,
            clear_on_open: true,
            port_aliases: HashMap::new(),
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn read_backoff(&self) -> Duration {
        Duration::from_millis(self.read_backoff_ms)
    }

    /// Resolve a port name through aliases, then parse it.
    pub fn resolve_port(&self, name: &str) -> PortIdentifier {
        let resolved = self.port_aliases.get(name).map(String::as_str).unwrap_or(name);
        match resolved.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }

    /// Settings for a [`SerialLineReader`](crate::SerialLineReader).
    pub fn reader_settings(&self) -> ReaderSettings {
        ReaderSettings {
            default_baud: self.default_baud,
            timeout: self.timeout(),
            chunk_size: self.chunk_size,
            read_backoff: self.read_backoff(),
            clear_on_open: self.clear_on_open,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}
