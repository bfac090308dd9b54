//! Console echo for log entries
//!
//! Every written entry is echoed once: DEBUG and INFO to stdout, ERROR to
//! stderr. Failure reports from the facade go through the same sink so hosts
//! that capture the console also capture them.

use std::sync::Mutex;

use crate::level::LogLevel;

/// Output stream an echoed line was sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// Get the stream used for entries at `level`
    pub fn for_level(level: LogLevel) -> Self {
        if level.is_error() {
            Stream::Stderr
        } else {
            Stream::Stdout
        }
    }
}

/// Destination for echoed entries and failure reports
pub trait Console: Send + Sync {
    /// Echo a formatted entry
    fn write_line(&self, level: LogLevel, line: &str);

    /// Report a failure the caller will not see as an error value
    fn report(&self, message: &str);
}

/// Writes to the process stdout/stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&self, level: LogLevel, line: &str) {
        match Stream::for_level(level) {
            Stream::Stdout => println!("{}", line),
            Stream::Stderr => eprintln!("{}", line),
        }
    }

    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Captures console output in memory
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<(Stream, String)>>,
    reports: Mutex<Vec<String>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// All echoed lines with the stream each went to
    pub fn lines(&self) -> Vec<(Stream, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Echoed lines sent to one stream
    pub fn lines_on(&self, stream: Stream) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, line)| line)
            .collect()
    }

    /// Failure reports received so far
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Console for MemoryConsole {
    fn write_line(&self, level: LogLevel, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((Stream::for_level(level), line.to_string()));
        }
    }

    fn report(&self, message: &str) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(message.to_string());
        }
    }
}
