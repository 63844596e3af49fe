//! Port abstraction layer for serial communication.
//!
//! Provides the adapter trait the line reader is written against, the real
//! `serialport`-backed implementation, and a mock for tests.

pub mod error;
pub mod identifier;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use identifier::PortIdentifier;
pub use mock::{MockBackend, MockSerialPort};
pub use sync_port::*;
pub use traits::*;
