//! Tests requiring actual serial hardware.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export TEST_PORT=COM3                  # or /dev/ttyUSB0, or a port number
//! export TEST_BAUD=9600                  # optional, default: 9600
//! export TEST_LOOPBACK=1                 # if the port has TX wired to RX
//!
//! cargo test -- --ignored
//! ```

use serial_line_reader::port::{PortConfiguration, PortIdentifier, SerialPortAdapter, SyncSerialPort};
use serial_line_reader::SerialLineReader;
use std::env;
use std::thread;
use std::time::{Duration, Instant};

/// Get the test port from environment variable.
fn get_test_port() -> Option<PortIdentifier> {
    env::var("TEST_PORT").ok().map(|p| p.parse().unwrap())
}

/// Get the test baud rate from environment variable (default: 9600).
fn get_test_baud() -> u32 {
    env::var("TEST_BAUD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9600)
}

/// Check if loopback testing is enabled.
fn is_loopback_enabled() -> bool {
    env::var("TEST_LOOPBACK").ok().as_deref() == Some("1")
}

/// Skip test if hardware is not available.
fn skip_without_hardware() -> Option<PortIdentifier> {
    let port = get_test_port();
    if port.is_none() {
        println!("Skipping hardware test: TEST_PORT not set");
    }
    port
}

#[test]
#[ignore]
fn test_real_port_open_close() {
    let Some(port) = skip_without_hardware() else {
        return;
    };

    let mut reader = SerialLineReader::new();
    assert!(reader.open(port.clone(), get_test_baud()), "failed to open {port}");
    assert!(reader.is_open());

    let start = Instant::now();
    reader.close();
    assert!(!reader.is_open());
    assert!(start.elapsed() < Duration::from_secs(1), "close took {:?}", start.elapsed());

    // Device must be free again.
    assert!(reader.open(port, get_test_baud()));
}

#[test]
#[ignore]
fn test_real_port_adapter_clone() {
    let Some(port) = skip_without_hardware() else {
        return;
    };

    let config = PortConfiguration::with_baud_rate(get_test_baud());
    let device = SyncSerialPort::open(&port.device_path().unwrap(), &config).expect("open failed");
    let clone = device.try_clone_adapter().expect("clone failed");
    assert_eq!(clone.name(), device.name());
}

#[test]
#[ignore]
fn test_real_port_loopback_lines() {
    if !is_loopback_enabled() {
        println!("Skipping loopback test: TEST_LOOPBACK not set to 1");
        return;
    }
    let Some(port) = skip_without_hardware() else {
        return;
    };

    let mut reader = SerialLineReader::new();
    assert!(reader.open(port, get_test_baud()));

    assert!(reader.write_line("LOOPBACK 1"));
    assert!(reader.write(b"LOOP"));
    assert!(reader.write(b"BACK 2\r\n"));

    let mut lines = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(2);
    while lines.len() < 2 && Instant::now() < deadline {
        match reader.read_line() {
            Some(line) => lines.push(line),
            None => thread::sleep(Duration::from_millis(10)),
        }
    }

    assert_eq!(lines, vec!["LOOPBACK 1", "LOOPBACK 2"]);
}
