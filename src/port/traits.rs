//! Core traits for serial port abstraction.
//!
//! `SerialPortAdapter` lets the line reader drive real hardware and mock
//! ports interchangeably; `PortBackend` is the seam through which a reader
//! acquires those ports.

use super::error::PortError;
use std::time::Duration;

/// Baud rate used when the caller does not specify one.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read/write timeout applied to newly opened ports.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

/// Boxed adapter handed out by a [`PortBackend`].
pub type PortAdapter = Box<dyn SerialPortAdapter>;

/// Parameters applied when a port is opened.
///
/// Line framing is fixed at 8 data bits, no parity, 1 stop bit with no
/// CTS/DSR or XON/XOFF handshaking; only the values below vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Bounded read/write timeout.
    pub timeout: Duration,

    /// Assert the DTR line after opening.
    pub assert_dtr: bool,

    /// Assert the RTS line after opening.
    pub assert_rts: bool,

    /// Discard whatever the driver has buffered in either direction.
    pub clear_on_open: bool,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            assert_dtr: true,
            assert_rts: true,
            clear_on_open: true,
        }
    }
}

impl PortConfiguration {
    /// Default configuration at the given baud rate.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }

    /// Reject parameters no driver accepts before touching the device.
    pub fn validate(&self) -> Result<(), PortError> {
        if self.baud_rate == 0 {
            return Err(PortError::config("baud rate must be positive"));
        }
        if self.timeout.is_zero() {
            return Err(PortError::config("timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Trait for serial port I/O operations.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written, which may be fewer
    /// than requested.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. An idle port yields an
    /// error for which [`PortError::is_timeout`] is true.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Discard any unread input and any unsent output.
    fn clear_buffers(&mut self) -> Result<(), PortError>;

    /// Open a second handle onto the same device.
    ///
    /// Both handles must tolerate concurrent use from different threads:
    /// one reading, the other writing.
    fn try_clone_adapter(&self) -> Result<PortAdapter, PortError>;
}

/// Source of serial ports for a line reader.
pub trait PortBackend: Send + Sync + std::fmt::Debug {
    /// Acquire exclusive access to `port_name` and apply `config`.
    fn open(&self, port_name: &str, config: &PortConfiguration) -> Result<PortAdapter, PortError>;
}
