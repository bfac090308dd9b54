//! Error type for log instance operations

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while preparing a log folder or flushing a buffer
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log folder {}", .path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list log folder {}", .path.display())]
    ListFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log file {}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("log instance has not been initialized")]
    NotInitialized,
}

impl LogError {
    /// Path the failed operation was working on, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            LogError::CreateFolder { path, .. }
            | LogError::ListFolder { path, .. }
            | LogError::WriteFile { path, .. } => Some(path),
            LogError::NotInitialized => None,
        }
    }
}
