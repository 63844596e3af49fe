//! Tracing subscriber setup for the `serial-lines` binary.
//!
//! Logs go to stderr so stdout carries only received lines. `RUST_LOG`
//! takes precedence over the configured level.

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{level}': {source}")]
    Filter {
        level: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Build the filter: `RUST_LOG` if set and valid, else the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|source| LoggingError::Filter {
        level: config.level.clone(),
        source,
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let builder = fmt()
        .with_env_filter(env_filter(config)?)
        .with_writer(std::io::stderr)
        .with_thread_names(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggingConfig {
            level: "serial_line_reader=verbose".to_string(),
            ..LoggingConfig::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert!(matches!(env_filter(&config), Err(LoggingError::Filter { .. })));
        }
    }

    #[test]
    fn test_default_level_parses() {
        assert!(env_filter(&LoggingConfig::default()).is_ok());
    }
}
