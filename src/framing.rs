//! Line assembly from a raw byte stream.
//!
//! Every byte is appended to a partial-line buffer. A carriage return or a
//! line feed each end the current line on their own, so `\r\n` is two
//! terminators: the first completes the line, the second finds an empty
//! buffer and produces nothing. Terminator characters are stripped from the
//! completed line and empty results are dropped.

use memchr::memchr2;

/// Accumulates bytes across reads and yields completed lines.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: Vec<u8>,
}

/// Whether `byte` ends a line.
pub fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read's worth of bytes, calling `emit` for each completed
    /// non-empty line in stream order.
    ///
    /// Bytes after the last terminator stay buffered for the next call.
    pub fn feed(&mut self, mut bytes: &[u8], mut emit: impl FnMut(String)) {
        while let Some(pos) = memchr2(b'\r', b'\n', bytes) {
            self.partial.extend_from_slice(&bytes[..=pos]);
            if let Some(line) = self.take_line() {
                emit(line);
            }
            bytes = &bytes[pos + 1..];
        }
        self.partial.extend_from_slice(bytes);
    }

    #[cfg(test)]
    fn feed_collect(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        self.feed(bytes, |line| lines.push(line));
        lines
    }

    /// Bytes received since the last terminator.
    pub fn partial(&self) -> &[u8] {
        &self.partial
    }

    fn take_line(&mut self) -> Option<String> {
        self.partial.retain(|&b| !is_terminator(b));
        let line = if self.partial.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.partial).into_owned())
        };
        self.partial.clear();
        line
    }
}
