//! Reader-level error type.
//!
//! The boolean facade of [`SerialLineReader`](crate::SerialLineReader)
//! collapses these into `true`/`false`; the `try_*` methods return them.

use crate::port::PortError;
use std::io;
use thiserror::Error;

/// Errors surfaced by the line reader.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The operation needs an open session.
    #[error("Operation requires an open serial port, but the port is closed")]
    NotOpen,

    /// The device accepted fewer bytes than were requested.
    #[error("Short write: {written} of {requested} bytes accepted")]
    ShortWrite { written: usize, requested: usize },

    /// Acquiring, configuring or using the device failed.
    #[error(transparent)]
    Port(#[from] PortError),

    /// The background reader thread could not be started.
    #[error("Failed to start reader thread: {0}")]
    WorkerSpawn(#[source] io::Error),
}

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;
