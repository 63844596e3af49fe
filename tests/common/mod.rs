//! Shared test utilities for line reader tests.
//!
//! - Reader construction against a `MockBackend` with short timeouts
//! - Polling helpers that wait for the background worker

#![allow(dead_code)]

use serial_line_reader::port::{MockBackend, MockSerialPort};
use serial_line_reader::{ReaderSettings, SerialLineReader};
use std::thread;
use std::time::{Duration, Instant};

/// How long helpers wait for the worker before giving up.
pub const WAIT: Duration = Duration::from_secs(3);

/// Settings with timeouts short enough to keep tests fast.
pub fn fast_settings() -> ReaderSettings {
    ReaderSettings {
        timeout: Duration::from_millis(2),
        read_backoff: Duration::from_millis(1),
        ..ReaderSettings::default()
    }
}

/// A reader with mock devices registered under each of `names`.
pub fn reader_with_ports(names: &[&str]) -> (SerialLineReader, Vec<MockSerialPort>) {
    let backend = MockBackend::new();
    let ports = names.iter().map(|name| backend.add_port(*name)).collect();
    (SerialLineReader::with_backend(backend, fast_settings()), ports)
}

/// A reader on `MOCK0` that pauses `backoff` after a failed or empty read.
pub fn paced_reader(backoff: Duration) -> (SerialLineReader, MockSerialPort) {
    let backend = MockBackend::new();
    let port = backend.add_port("MOCK0");
    let settings = ReaderSettings {
        read_backoff: backoff,
        ..fast_settings()
    };
    (SerialLineReader::with_backend(backend, settings), port)
}

/// A reader with a single mock device named `MOCK0`.
pub fn mock_reader() -> (SerialLineReader, MockSerialPort) {
    let (reader, mut ports) = reader_with_ports(&["MOCK0"]);
    (reader, ports.remove(0))
}

/// Poll `condition` until it holds or [`WAIT`] elapses.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Wait until the mock has handed every enqueued chunk to the worker and
/// the worker has gone back to reading.
pub fn wait_until_consumed(port: &MockSerialPort) {
    let settled = wait_until(|| port.pending_chunks() == 0);
    assert!(settled, "worker did not consume enqueued chunks");
    let reads = port.reads_attempted();
    assert!(
        wait_until(|| port.reads_attempted() > reads),
        "worker stopped reading"
    );
}

/// Collect lines until `count` have arrived or [`WAIT`] elapses.
pub fn collect_lines(reader: &SerialLineReader, count: usize) -> Vec<String> {
    let mut lines = Vec::new();
    wait_until(|| {
        while let Some(line) = reader.read_line() {
            lines.push(line);
        }
        lines.len() >= count
    });
    lines
}
