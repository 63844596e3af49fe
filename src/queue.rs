//! Thread-safe FIFO of completed lines.
//!
//! The background reader is the only producer and the reader's caller the
//! only consumer; both go through a single mutex, so each line is observed
//! exactly once. The queue is unbounded.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Shared handle onto a line queue. Clones refer to the same queue.
#[derive(Debug, Clone, Default)]
pub struct LineQueue {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed line.
    pub fn push(&self, line: String) {
        self.lines.lock().push_back(line);
    }

    /// Remove and return the oldest line, if any. Never blocks on I/O.
    pub fn pop(&self) -> Option<String> {
        self.lines.lock().pop_front()
    }

    /// Remove and return every queued line, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.lines.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}
