//! Hardware-specific tests requiring real serial devices.
//!
//! Ignored by default; run manually with `--ignored` and `TEST_PORT` set.

pub mod real_port_tests;
