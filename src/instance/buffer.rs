//! In-memory buffer of formatted entries
//!
//! Append-only for the lifetime of an instance; the whole contents are what
//! gets written to the log file on dispose.

/// Newline-terminated formatted entries in append order
#[derive(Debug, Default, Clone)]
pub struct LogBuffer {
    contents: String,
    lines: usize,
}

impl LogBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry followed by a newline
    pub fn push_line(&mut self, line: &str) {
        self.contents.push_str(line);
        self.contents.push('\n');
        self.lines += 1;
    }

    /// Full buffer contents
    pub fn as_str(&self) -> &str {
        &self.contents
    }

    /// Number of entries in the buffer
    pub fn len(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Drop all entries (only done when an instance is re-initialized)
    pub(crate) fn clear(&mut self) {
        self.contents.clear();
        self.lines = 0;
    }
}
