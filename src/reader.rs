//! Serial line reader: session lifecycle and background line assembly.
//!
//! # Threading
//!
//! ```text
//!  caller ── write ──> writer handle (Mutex)
//!         <─ read_line ─ LineQueue <── push ── worker ── read ──> reader handle
//! ```
//!
//! Each open session owns two handles onto the device: the caller writes
//! through one, the worker thread reads through a clone of it. `close`
//! raises the stop flag, joins the worker and only then drops the writer
//! handle, so the device is never released while the worker may touch it.

use crate::error::{ReaderError, ReaderResult};
use crate::framing::LineAssembler;
use crate::port::{
    PortAdapter, PortBackend, PortConfiguration, PortIdentifier, SerialPortAdapter,
    SystemBackend, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT,
};
use crate::queue::LineQueue;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Bytes requested from the device per read.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Pause after a failed read before trying again.
pub const DEFAULT_READ_BACKOFF: Duration = Duration::from_millis(10);

/// Tunables applied to every session a reader opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    /// Baud rate used by [`SerialLineReader::open_default`].
    pub default_baud: u32,
    /// Read/write timeout on the device.
    pub timeout: Duration,
    /// Maximum bytes per read.
    pub chunk_size: usize,
    /// Sleep after a non-timeout read failure.
    pub read_backoff: Duration,
    /// Discard driver buffers when opening.
    pub clear_on_open: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            default_baud: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            read_backoff: DEFAULT_READ_BACKOFF,
            clear_on_open: true,
        }
    }
}

impl ReaderSettings {
    /// Device configuration for a session at `baud_rate`.
    pub fn port_configuration(&self, baud_rate: u32) -> PortConfiguration {
        PortConfiguration {
            baud_rate,
            timeout: self.timeout,
            assert_dtr: true,
            assert_rts: true,
            clear_on_open: self.clear_on_open,
        }
    }
}

/// Snapshot of a session's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReaderStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub lines_received: u64,
    pub read_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    lines_received: AtomicU64,
    read_errors: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ReaderStats {
        ReaderStats {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            lines_received: self.lines_received.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }
}

/// One open connection and its worker.
#[derive(Debug)]
struct Session {
    port: Mutex<PortAdapter>,
    name: String,
    baud_rate: u32,
    stop: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

/// Reads CR/LF-terminated lines from one serial port at a time.
///
/// `open`/`close` need exclusive access; `write`, `read_line` and
/// `is_open` take `&self`, so a reader can be shared behind an `Arc` once
/// a session is running. Dropping the reader closes its session.
///
/// # Example
/// ```no_run
/// use serial_line_reader::SerialLineReader;
///
/// let mut reader = SerialLineReader::new();
/// if reader.open("/dev/ttyUSB0", 9600) {
///     reader.write(b"PING\r\n");
///     while let Some(line) = reader.read_line() {
///         println!("{line}");
///     }
///     reader.close();
/// }
/// ```
#[derive(Debug)]
pub struct SerialLineReader {
    backend: Box<dyn PortBackend>,
    settings: ReaderSettings,
    session: Option<Session>,
    queue: LineQueue,
    counters: Arc<Counters>,
}

impl Default for SerialLineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialLineReader {
    /// Reader for real devices with default settings.
    pub fn new() -> Self {
        Self::with_backend(SystemBackend, ReaderSettings::default())
    }

    /// Reader acquiring ports from `backend`.
    pub fn with_backend(backend: impl PortBackend + 'static, settings: ReaderSettings) -> Self {
        Self {
            backend: Box::new(backend),
            settings,
            session: None,
            queue: LineQueue::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Open `port` at `baud_rate`, closing any current session first.
    ///
    /// Returns `false` if the device cannot be acquired or configured or
    /// the worker cannot be started; the reader is then closed.
    pub fn open(&mut self, port: impl Into<PortIdentifier>, baud_rate: u32) -> bool {
        let port = port.into();
        match self.try_open(port.clone(), baud_rate) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to open {} at {} baud: {}", port, baud_rate, e);
                false
            }
        }
    }

    /// [`open`](Self::open) at the configured default baud rate.
    pub fn open_default(&mut self, port: impl Into<PortIdentifier>) -> bool {
        let baud_rate = self.settings.default_baud;
        self.open(port, baud_rate)
    }

    /// Like [`open`](Self::open), reporting why opening failed.
    pub fn try_open(&mut self, port: impl Into<PortIdentifier>, baud_rate: u32) -> ReaderResult<()> {
        self.close();
        self.queue.clear();

        let device = port.into().device_path()?;
        let config = self.settings.port_configuration(baud_rate);

        let writer = self.backend.open(&device, &config)?;
        let reader = writer.try_clone_adapter()?;

        self.counters = Arc::new(Counters::default());
        let stop = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            port: reader,
            queue: self.queue.clone(),
            stop: Arc::clone(&stop),
            counters: Arc::clone(&self.counters),
            chunk_size: self.settings.chunk_size.max(1),
            backoff: self.settings.read_backoff,
        };
        let handle = thread::Builder::new()
            .name(format!("serial-lines:{device}"))
            .spawn(move || worker.run())
            .map_err(ReaderError::WorkerSpawn)?;

        info!("Opened {} at {} baud", device, baud_rate);
        self.session = Some(Session {
            port: Mutex::new(writer),
            name: device,
            baud_rate,
            stop,
            worker: handle,
        });
        Ok(())
    }

    /// Stop the worker, wait for it to exit, then release the device.
    ///
    /// Does nothing if no session is open.
    pub fn close(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let Session {
            port,
            name,
            stop,
            worker,
            ..
        } = session;

        stop.store(true, Ordering::Release);
        if worker.join().is_err() {
            warn!("Reader thread for {} panicked", name);
        }
        drop(port);

        info!("Closed {}", name);
    }

    /// Write all of `data` in one blocking call.
    ///
    /// Returns `true` only if the device accepted every byte; there is no
    /// retry of partial writes.
    pub fn write(&self, data: &[u8]) -> bool {
        match self.try_write(data) {
            Ok(()) => true,
            Err(ReaderError::NotOpen) => {
                debug!("Write of {} bytes rejected: port closed", data.len());
                false
            }
            Err(e) => {
                warn!("Write failed: {}", e);
                false
            }
        }
    }

    /// Like [`write`](Self::write), reporting why writing failed.
    pub fn try_write(&self, data: &[u8]) -> ReaderResult<()> {
        let session = self.session.as_ref().ok_or(ReaderError::NotOpen)?;
        let written = session.port.lock().write_bytes(data)?;
        self.counters
            .bytes_written
            .fetch_add(written as u64, Ordering::Relaxed);

        if written != data.len() {
            return Err(ReaderError::ShortWrite {
                written,
                requested: data.len(),
            });
        }
        Ok(())
    }

    /// Write `text` followed by CR LF.
    pub fn write_line(&self, text: &str) -> bool {
        let mut data = Vec::with_capacity(text.len() + 2);
        data.extend_from_slice(text.as_bytes());
        data.extend_from_slice(b"\r\n");
        self.write(&data)
    }

    /// Remove and return the oldest completed line without blocking.
    pub fn read_line(&self) -> Option<String> {
        self.queue.pop()
    }

    /// Remove and return every completed line, oldest first.
    pub fn drain_lines(&self) -> Vec<String> {
        self.queue.drain()
    }

    /// Lines waiting to be read.
    pub fn pending_lines(&self) -> usize {
        self.queue.len()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Device path of the open session.
    pub fn port_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }

    /// Baud rate of the open session.
    pub fn baud_rate(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.baud_rate)
    }

    /// Counters for the current, or most recently closed, session.
    pub fn stats(&self) -> ReaderStats {
        self.counters.snapshot()
    }
}

impl Drop for SerialLineReader {
    fn drop(&mut self) {
        self.close();
    }
}

/// State moved onto the background thread.
struct Worker {
    port: PortAdapter,
    queue: LineQueue,
    stop: Arc<AtomicBool>,
    counters: Arc<Counters>,
    chunk_size: usize,
    backoff: Duration,
}

impl Worker {
    fn run(mut self) {
        let mut buffer = vec![0u8; self.chunk_size];
        let mut assembler = LineAssembler::new();
        let mut error_streak: u32 = 0;

        debug!("Reader thread started for {}", self.port.name());

        while !self.stop.load(Ordering::Acquire) {
            match self.port.read_bytes(&mut buffer) {
                Ok(0) => thread::sleep(self.backoff),
                Ok(n) => {
                    error_streak = 0;
                    self.counters
                        .bytes_read
                        .fetch_add(n as u64, Ordering::Relaxed);

                    let queue = &self.queue;
                    let counters = &self.counters;
                    assembler.feed(&buffer[..n], |line| {
                        trace!("Line received: {:?}", line);
                        counters.lines_received.fetch_add(1, Ordering::Relaxed);
                        queue.push(line);
                    });
                }
                Err(e) if e.is_timeout() => {}
                Err(e) => {
                    error_streak = error_streak.saturating_add(1);
                    self.counters.read_errors.fetch_add(1, Ordering::Relaxed);
                    if error_streak == 1 {
                        warn!("Read error on {}: {}", self.port.name(), e);
                    } else {
                        debug!(
                            "Read error on {} ({} in a row): {}",
                            self.port.name(),
                            error_streak,
                            e
                        );
                    }
                    thread::sleep(self.backoff);
                }
            }
        }

        debug!(
            "Reader thread for {} stopped, {} unterminated bytes discarded",
            self.port.name(),
            assembler.partial().len()
        );
    }
}
