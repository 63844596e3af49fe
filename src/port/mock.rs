//! Mock serial port implementation for testing.
//!
//! `MockSerialPort` simulates a device without hardware. Reads are served
//! chunk by chunk in the order they were enqueued, so tests control exactly
//! where read boundaries fall. Faults (read errors, short writes, failed
//! clones) can be injected, and the number of live handles is tracked so
//! tests can observe when a reader releases the device.

use super::error::PortError;
use super::traits::{PortAdapter, PortBackend, PortConfiguration, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Inner state shared by every handle onto one mock device.
#[derive(Debug, Default)]
struct MockPortState {
    /// Chunks returned by successive reads, one chunk per read.
    read_chunks: VecDeque<Vec<u8>>,
    /// Number of upcoming reads that fail with a non-timeout error.
    read_failures: usize,
    /// Total read calls, successful or not.
    reads_attempted: usize,
    /// Log of all bytes accepted by writes.
    write_log: Vec<Vec<u8>>,
    /// Maximum bytes accepted per write; `None` accepts everything.
    write_limit: Option<usize>,
    /// Whether writes fail outright.
    fail_writes: bool,
    /// Whether `try_clone_adapter` fails.
    fail_clone: bool,
    /// Configured timeout duration.
    timeout: Duration,
    /// Whether buffers have been cleared.
    buffers_cleared: bool,
    /// Handles currently held by code under test.
    live_handles: usize,
    /// Times a backend has opened this device.
    open_count: usize,
    /// Configuration passed to the most recent open.
    last_config: Option<PortConfiguration>,
}

/// Mock serial port implementation for testing.
///
/// Clones made with `Clone` are test-side controllers and do not count as
/// open handles; handles handed to code under test (through
/// [`MockBackend`] or [`SerialPortAdapter::try_clone_adapter`]) do.
///
/// # Example
/// ```
/// use serial_line_reader::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"OK\r\n");
///
/// let mut buffer = [0u8; 16];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"OK\r\n");
///
/// port.write_bytes(b"AT\r\n").unwrap();
/// assert_eq!(port.get_write_log(), vec![b"AT\r\n".to_vec()]);
/// ```
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
    counted: bool,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: super::traits::DEFAULT_TIMEOUT,
                ..Default::default()
            })),
            counted: false,
        }
    }

    /// A handle that counts towards [`live_handles`](Self::live_handles).
    fn open_handle(&self) -> Self {
        self.state.lock().live_handles += 1;
        Self {
            name: self.name.clone(),
            state: Arc::clone(&self.state),
            counted: true,
        }
    }

    /// Enqueue one chunk to be returned by a single subsequent read.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().read_chunks.push_back(data.to_vec());
    }

    /// Make the next `count` reads fail with a non-timeout I/O error.
    pub fn fail_next_reads(&self, count: usize) {
        self.state.lock().read_failures = count;
    }

    /// Accept at most `limit` bytes per write; `None` lifts the limit.
    pub fn set_write_limit(&self, limit: Option<usize>) {
        self.state.lock().write_limit = limit;
    }

    /// Make every write fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Make `try_clone_adapter` fail.
    pub fn set_fail_clone(&self, fail: bool) {
        self.state.lock().fail_clone = fail;
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Get whether buffers have been cleared.
    pub fn was_cleared(&self) -> bool {
        self.state.lock().buffers_cleared
    }

    /// Chunks still waiting to be read.
    pub fn pending_chunks(&self) -> usize {
        self.state.lock().read_chunks.len()
    }

    /// Total read calls made against this device.
    pub fn reads_attempted(&self) -> usize {
        self.state.lock().reads_attempted
    }

    /// Handles currently held by code under test.
    pub fn live_handles(&self) -> usize {
        self.state.lock().live_handles
    }

    /// Times this device has been opened through a backend.
    pub fn open_count(&self) -> usize {
        self.state.lock().open_count
    }

    /// Configuration passed to the most recent open.
    pub fn last_config(&self) -> Option<PortConfiguration> {
        self.state.lock().last_config.clone()
    }

    /// Read timeout applied by the most recent open.
    pub fn timeout(&self) -> Duration {
        self.state.lock().timeout
    }
}

impl Clone for MockSerialPort {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            state: Arc::clone(&self.state),
            counted: false,
        }
    }
}

impl Drop for MockSerialPort {
    fn drop(&mut self) {
        if self.counted {
            let mut state = self.state.lock();
            state.live_handles = state.live_handles.saturating_sub(1);
        }
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if state.fail_writes {
            return Err(PortError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "simulated write failure",
            )));
        }

        let accepted = state.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
        state.write_log.push(data[..accepted].to_vec());
        Ok(accepted)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let timeout = {
            let mut state = self.state.lock();
            state.reads_attempted += 1;

            if state.read_failures > 0 {
                state.read_failures -= 1;
                return Err(PortError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "simulated read failure",
                )));
            }

            if let Some(mut chunk) = state.read_chunks.pop_front() {
                let n = chunk.len().min(buffer.len());
                buffer[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    state.read_chunks.push_front(chunk.split_off(n));
                }
                return Ok(n);
            }
            state.timeout
        };

        // Idle: behave like a driver waiting out its read timeout, without
        // holding the lock so writers are not blocked.
        thread::sleep(timeout);
        Err(PortError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            "Operation timed out",
        )))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        state.read_chunks.clear();
        state.buffers_cleared = true;
        Ok(())
    }

    fn try_clone_adapter(&self) -> Result<PortAdapter, PortError> {
        if self.state.lock().fail_clone {
            return Err(PortError::Io(io::Error::new(
                io::ErrorKind::Other,
                "simulated clone failure",
            )));
        }
        Ok(Box::new(self.open_handle()))
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("pending_chunks", &self.pending_chunks())
            .field("counted", &self.counted)
            .finish()
    }
}

/// Backend serving registered [`MockSerialPort`]s by name.
///
/// Opening enforces exclusive access: a device with live handles reports
/// busy, as real drivers do.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    ports: Arc<Mutex<HashMap<String, MockSerialPort>>>,
}

impl MockBackend {
    /// Create a backend with no devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and return a controller for it.
    pub fn add_port(&self, name: impl Into<String>) -> MockSerialPort {
        let port = MockSerialPort::new(name);
        self.ports.lock().insert(port.name.clone(), port.clone());
        port
    }
}

impl PortBackend for MockBackend {
    fn open(&self, port_name: &str, config: &PortConfiguration) -> Result<PortAdapter, PortError> {
        config.validate()?;

        let ports = self.ports.lock();
        let port = ports
            .get(port_name)
            .ok_or_else(|| PortError::not_found(port_name))?;

        {
            let mut state = port.state.lock();
            if state.live_handles > 0 {
                return Err(PortError::Serial(serialport::Error::new(
                    serialport::ErrorKind::Io(io::ErrorKind::Other),
                    format!("{port_name} is busy"),
                )));
            }
            state.open_count += 1;
            state.timeout = config.timeout;
            state.last_config = Some(config.clone());
        }

        let mut handle = port.open_handle();
        if config.clear_on_open {
            handle.clear_buffers()?;
        }
        Ok(Box::new(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_follow_chunk_boundaries() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"AB");
        port.enqueue_read(b"CD");

        let mut buffer = [0u8; 16];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"AB");
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"CD");
    }

    #[test]
    fn test_oversized_chunk_is_split() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello, World!");

        let mut buffer = [0u8; 5];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"Hello");
        assert_eq!(port.pending_chunks(), 1);
    }

    #[test]
    fn test_empty_read_times_out() {
        let backend = MockBackend::new();
        let port = backend.add_port("MOCK0");
        let config = PortConfiguration {
            timeout: Duration::from_millis(1),
            ..PortConfiguration::default()
        };
        let mut handle = backend.open("MOCK0", &config).unwrap();
        assert_eq!(port.timeout(), Duration::from_millis(1));

        let mut buffer = [0u8; 10];
        let err = handle.read_bytes(&mut buffer).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_empty_chunk_reads_zero_bytes() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"");

        let mut buffer = [0u8; 4];
        assert_eq!(port.read_bytes(&mut buffer).unwrap(), 0);
        assert_eq!(port.pending_chunks(), 0);
    }

    #[test]
    fn test_injected_read_failures() {
        let mut port = MockSerialPort::new("MOCK0");
        port.fail_next_reads(2);
        port.enqueue_read(b"x");

        let mut buffer = [0u8; 4];
        assert!(!port.read_bytes(&mut buffer).unwrap_err().is_timeout());
        assert!(!port.read_bytes(&mut buffer).unwrap_err().is_timeout());
        assert_eq!(port.read_bytes(&mut buffer).unwrap(), 1);
        assert_eq!(port.reads_attempted(), 3);
    }

    #[test]
    fn test_write_limit_simulates_short_write() {
        let mut port = MockSerialPort::new("MOCK0");
        port.set_write_limit(Some(3));

        assert_eq!(port.write_bytes(b"ABCDEF").unwrap(), 3);
        assert_eq!(port.get_write_log(), vec![b"ABC".to_vec()]);
    }

    #[test]
    fn test_clone_handles_are_counted() {
        let port = MockSerialPort::new("MOCK0");
        assert_eq!(port.live_handles(), 0);

        let handle = port.try_clone_adapter().unwrap();
        let controller = port.clone();
        assert_eq!(port.live_handles(), 1);

        drop(controller);
        assert_eq!(port.live_handles(), 1);
        drop(handle);
        assert_eq!(port.live_handles(), 0);
    }

    #[test]
    fn test_backend_open_and_busy() {
        let backend = MockBackend::new();
        let port = backend.add_port("MOCK0");
        port.enqueue_read(b"stale");

        let config = PortConfiguration::with_baud_rate(19200);
        let handle = backend.open("MOCK0", &config).unwrap();
        assert_eq!(port.open_count(), 1);
        assert_eq!(port.last_config(), Some(config.clone()));
        assert!(port.was_cleared());
        assert_eq!(port.pending_chunks(), 0);

        assert!(backend.open("MOCK0", &config).is_err());
        drop(handle);
        assert!(backend.open("MOCK0", &config).is_ok());
    }

    #[test]
    fn test_backend_unknown_port() {
        let backend = MockBackend::new();
        let result = backend.open("MOCK9", &PortConfiguration::default());
        assert!(matches!(result, Err(PortError::NotFound(name)) if name == "MOCK9"));
    }
}
