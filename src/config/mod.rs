//! Configuration for the line reader and the `serial-lines` binary.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the first of these that exists:
//!
//! 1. `SERIAL_LINES_CONFIG` environment variable (explicit path)
//! 2. `./serial-lines.toml` (current directory)
//! 3. `serial-lines/config.toml` in the platform config directory
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Values can be overridden with `SERIAL_LINES_<SECTION>_<KEY>`, e.g.
//! `SERIAL_LINES_SERIAL_DEFAULT_BAUD=115200` or
//! `SERIAL_LINES_LOGGING_LEVEL=debug`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serial_line_reader::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let settings = loader.config().serial.reader_settings();
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{Config, LogFormat, LoggingConfig, SerialConfig};
