//! Serial Line Reader Library
//!
//! Owns one serial port at a time, reads it on a background thread, splits
//! the byte stream into CR/LF-terminated lines and queues them for a caller
//! that polls without blocking and may write to the port concurrently.
//!
//! # Modules
//!
//! - `reader`: `SerialLineReader`, the session and worker lifecycle
//! - `framing`: line assembly from raw bytes
//! - `queue`: thread-safe FIFO of completed lines
//! - `port`: port abstraction layer (real devices and mocks)
//! - `config`: TOML configuration with environment overrides
//! - `logging`: tracing subscriber setup
//! - `error`: reader-level errors

pub mod config;
pub mod error;
pub mod framing;
pub mod logging;
pub mod port;
pub mod queue;
pub mod reader;

pub use error::{ReaderError, ReaderResult};
pub use framing::LineAssembler;
pub use port::{
    MockBackend, MockSerialPort, PortBackend, PortConfiguration, PortError, PortIdentifier,
    SerialPortAdapter, SyncSerialPort, SystemBackend,
};
pub use queue::LineQueue;
pub use reader::{ReaderSettings, ReaderStats, SerialLineReader};

pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
