//! Synchronous serial port implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own
//! `SerialPortAdapter` trait so the line reader can be tested against mocks.

use super::error::PortError;
use super::traits::{PortAdapter, PortBackend, PortConfiguration, SerialPortAdapter};
use std::io::{Read, Write};
use tracing::debug;

/// Synchronous serial port implementation wrapping `serialport::SerialPort`.
pub struct SyncSerialPort {
    /// The underlying serial port implementation.
    port: Box<dyn serialport::SerialPort>,
    /// The port name/path for identification.
    name: String,
}

impl SyncSerialPort {
    /// Open a serial port with 8-N-1 framing and the given configuration.
    ///
    /// The handle is dropped again if any step after acquisition fails, so
    /// an error never leaves the device held.
    ///
    /// # Example
    /// ```no_run
    /// use serial_line_reader::port::{PortConfiguration, SyncSerialPort};
    ///
    /// let port = SyncSerialPort::open("/dev/ttyUSB0", &PortConfiguration::default())?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port_name: &str, config: &PortConfiguration) -> Result<Self, PortError> {
        config.validate()?;

        let mut port = serialport::new(port_name, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .flow_control(serialport::FlowControl::None)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(config.timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        if config.assert_dtr {
            port.write_data_terminal_ready(true)?;
        }
        if config.assert_rts {
            port.write_request_to_send(true)?;
        }

        let mut opened = Self {
            port,
            name: port_name.to_string(),
        };
        if config.clear_on_open {
            opened.clear_buffers()?;
        }

        debug!(
            "Opened {} at {} baud (timeout {:?})",
            port_name, config.baud_rate, config.timeout
        );
        Ok(opened)
    }
}

impl SerialPortAdapter for SyncSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.port.write(data).map_err(PortError::Io)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.port.read(buffer).map_err(PortError::Io)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .map_err(PortError::Serial)
    }

    fn try_clone_adapter(&self) -> Result<PortAdapter, PortError> {
        let port = self.port.try_clone().map_err(PortError::Serial)?;
        Ok(Box::new(Self {
            port,
            name: self.name.clone(),
        }))
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}

/// Backend that opens real devices through the `serialport` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

impl PortBackend for SystemBackend {
    fn open(&self, port_name: &str, config: &PortConfiguration) -> Result<PortAdapter, PortError> {
        Ok(Box::new(SyncSerialPort::open(port_name, config)?))
    }
}

/// Names of the serial ports currently present on the system.
pub fn available_port_names() -> Result<Vec<String>, PortError> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_error() {
        let result = SyncSerialPort::open(
            "/dev/nonexistent_port_12345",
            &PortConfiguration::default(),
        );

        match result {
            Err(PortError::NotFound(name)) => assert!(name.contains("nonexistent")),
            Err(PortError::Serial(_)) | Err(PortError::Io(_)) => {}
            Err(e) => panic!("Expected open failure, got: {:?}", e),
            Ok(_) => panic!("Nonexistent port unexpectedly opened"),
        }
    }

    #[test]
    fn test_zero_baud_rejected_before_open() {
        let config = PortConfiguration::with_baud_rate(0);
        let result = SyncSerialPort::open("/dev/nonexistent_port_12345", &config);
        assert!(matches!(result, Err(PortError::Config(_))));
    }

    #[test]
    fn test_system_backend_reports_failure() {
        let result = SystemBackend.open("/dev/nonexistent_port_12345", &PortConfiguration::default());
        assert!(result.is_err());
    }
}
