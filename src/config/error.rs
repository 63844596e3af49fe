//! Errors raised while loading `serial-lines.toml` and its overrides.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Not valid TOML, or a key of the wrong type.
    #[error("cannot parse configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A value no session could run with, keyed as in the file
    /// (`serial.chunk_size`).
    #[error("invalid {key}: {reason}")]
    Invalid {
        key: &'static str,
        reason: &'static str,
    },

    /// A `SERIAL_LINES_*` override that does not parse.
    #[error("{var}={value:?} is not a valid {expected}")]
    Env {
        var: String,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: &'static str) -> Self {
        Self::Invalid { key, reason }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
