//! Serial device identifiers.
//!
//! Callers may name a port either by number (`3`) or by path (`COM3`,
//! `/dev/ttyUSB0`). Numbers follow the Windows convention where `COM1` is
//! the first port; on other platforms they map onto `/dev/ttySn` with the
//! first port at `ttyS0`. There is no port 0.

use super::error::PortError;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A serial device, by number or by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortIdentifier {
    /// One-based port number.
    Number(u32),
    /// Device name or path used verbatim.
    Path(String),
}

impl PortIdentifier {
    /// The device path passed to the OS.
    pub fn device_path(&self) -> Result<String, PortError> {
        match self {
            Self::Number(0) => Err(PortError::config("port numbers start at 1")),
            Self::Number(n) => Ok(numbered_device(*n)),
            Self::Path(path) => Ok(path.clone()),
        }
    }
}

#[cfg(windows)]
fn numbered_device(n: u32) -> String {
    format!("COM{n}")
}

#[cfg(not(windows))]
fn numbered_device(n: u32) -> String {
    format!("/dev/ttyS{}", n - 1)
}

impl fmt::Display for PortIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "port {n}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

impl FromStr for PortIdentifier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<u32>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Path(trimmed.to_string()),
        })
    }
}

impl From<u32> for PortIdentifier {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PortIdentifier {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for PortIdentifier {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}
