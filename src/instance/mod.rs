//! A single buffered log stream and its backing file
//!
//! An instance collects formatted entries in memory from `initialize` until
//! `dispose`, then writes them to one timestamped file in its folder. It is
//! owned by exactly one context; the registry hands it out behind a lock.

pub mod buffer;
pub mod file_writer;
pub mod retention;

pub use buffer::LogBuffer;
pub use file_writer::{create_log_file_path, write_log_file};
pub use retention::{PendingDeletions, RetentionMode, RetentionReport};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use crate::config::{DEFAULT_FILE_EXTENSION, DEFAULT_MAX_FILES};
use crate::console::Console;
use crate::error::LogError;
use crate::format::format_entry;
use crate::level::LogLevel;
use crate::source::Source;

/// Point-in-time view of an instance's settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceStatus {
    pub folder: PathBuf,
    pub max_files: usize,
    pub debug: bool,
    /// Entries in the buffer
    pub entries: usize,
    pub output_file: Option<PathBuf>,
}

/// One context's logger
pub struct LogInstance {
    folder: PathBuf,
    max_files: usize,
    file_extension: String,
    retention: RetentionMode,
    debug: bool,
    echo: bool,
    buffer: LogBuffer,
    output_file: Option<PathBuf>,
    console: Arc<dyn Console>,
}

impl LogInstance {
    /// Create an uninitialized instance that echoes to `console`
    pub fn new(console: Arc<dyn Console>) -> Self {
        Self {
            folder: PathBuf::new(),
            max_files: DEFAULT_MAX_FILES,
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            retention: RetentionMode::default(),
            debug: false,
            echo: true,
            buffer: LogBuffer::new(),
            output_file: None,
            console,
        }
    }

    /// Set the file-count cap checked at the next `initialize`
    pub fn set_max_files(&mut self, max_files: usize) {
        self.max_files = max_files;
    }

    /// Set the extension used for the file named at the next `initialize`
    pub fn set_file_extension(&mut self, extension: impl Into<String>) {
        self.file_extension = extension.into();
    }

    /// Set how the next `initialize` removes files over the cap
    pub fn set_retention_mode(&mut self, mode: RetentionMode) {
        self.retention = mode;
    }

    /// Enable or disable console echo
    pub fn set_console_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Prepare the instance to receive entries
    ///
    /// Resets the buffer, names the output file, creates `folder` if needed,
    /// and applies retention. On error the buffer and output file are still
    /// set, so entries can be collected and a later flush can be attempted.
    pub fn initialize(&mut self, folder: impl Into<PathBuf>, debug: bool) -> Result<RetentionReport, LogError> {
        self.folder = folder.into();
        self.debug = debug;
        self.buffer.clear();

        let report = prepare_folder(&self.folder).and_then(|()| self.apply_retention());
        self.output_file = Some(create_log_file_path(&self.folder, &self.file_extension));
        report
    }

    fn apply_retention(&self) -> Result<RetentionReport, LogError> {
        let existing = fs::read_dir(&self.folder)
            .map(|entries| entries.count())
            .map_err(|source| LogError::ListFolder {
                path: self.folder.clone(),
                source,
            })?;

        let selected = retention::select_for_retention(&self.folder, self.max_files)?;
        let removed = match self.retention {
            RetentionMode::Immediate if !selected.is_empty() => retention::remove_entries(&selected),
            _ => 0,
        };

        if !selected.is_empty() {
            tracing::debug!(
                folder = %self.folder.display(),
                existing,
                selected = selected.len(),
                removed,
                "Applied log retention"
            );
        }

        Ok(RetentionReport {
            existing,
            selected,
            removed,
        })
    }

    /// Write an entry
    ///
    /// Debug entries are dropped without any side effect when debug is off.
    /// Otherwise the entry is echoed to the console and appended to the
    /// buffer, in that order. Returns the formatted line.
    pub fn log(&mut self, level: LogLevel, source: &Source, message: &str) -> Option<String> {
        if level == LogLevel::Debug && !self.debug {
            return None;
        }

        let line = format_entry(&Local::now(), level, source, message);
        if self.echo {
            self.console.write_line(level, &line);
        }
        self.buffer.push_line(&line);
        Some(line)
    }

    /// Write the buffer to the output file, replacing it
    pub fn flush(&self) -> Result<PathBuf, LogError> {
        let path = self.output_file.as_ref().ok_or(LogError::NotInitialized)?;
        write_log_file(path, self.buffer.as_str())?;
        Ok(path.clone())
    }

    /// Flush and release the instance
    pub fn dispose(self) -> Result<PathBuf, LogError> {
        self.flush()
    }

    /// Entries written since initialization
    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    /// File the buffer is written to on dispose
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn status(&self) -> InstanceStatus {
        InstanceStatus {
            folder: self.folder.clone(),
            max_files: self.max_files,
            debug: self.debug,
            entries: self.buffer.len(),
            output_file: self.output_file.clone(),
        }
    }
}

impl std::fmt::Debug for LogInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogInstance")
            .field("folder", &self.folder)
            .field("max_files", &self.max_files)
            .field("file_extension", &self.file_extension)
            .field("debug", &self.debug)
            .field("entries", &self.buffer.len())
            .field("output_file", &self.output_file)
            .finish()
    }
}

fn prepare_folder(folder: &Path) -> Result<(), LogError> {
    fs::create_dir_all(folder).map_err(|source| LogError::CreateFolder {
        path: folder.to_path_buf(),
        source,
    })
}
