//! Configuration defaults for new log instances

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::instance::retention::RetentionMode;

/// Default number of log files kept per context folder
pub const DEFAULT_MAX_FILES: usize = 50;

/// Default extension appended to log file names
pub const DEFAULT_FILE_EXTENSION: &str = ".log";

/// Settings used when a registry creates an instance
///
/// Embeddable in a host's own configuration file; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Base folder; each context gets a subfolder named after its id
    #[serde(default = "default_log_dir")]
    pub folder: PathBuf,

    /// Whether debug entries are written
    #[serde(default)]
    pub debug: bool,

    /// Maximum files kept per context folder (default: 50)
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Log file extension including the dot (default: ".log")
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// When files over the cap are removed
    #[serde(default)]
    pub retention: RetentionMode,

    /// Echo entries to the console (default: true)
    #[serde(default = "default_console_echo")]
    pub console_echo: bool,
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

fn default_console_echo() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            folder: default_log_dir(),
            debug: false,
            max_files: default_max_files(),
            file_extension: default_file_extension(),
            retention: RetentionMode::default(),
            console_echo: default_console_echo(),
        }
    }
}

impl LogConfig {
    /// Create a config rooted at `folder` with everything else defaulted
    pub fn new(folder: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            folder: folder.into(),
            debug,
            ..Self::default()
        }
    }

    /// Base folder with a leading `~` expanded to the home directory
    pub fn resolved_folder(&self) -> PathBuf {
        match self.folder.to_str() {
            Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
            None => self.folder.clone(),
        }
    }
}

/// Get the default base folder (~/.ctxlog/logs)
/// Falls back to ./.ctxlog/logs if home directory cannot be determined
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".ctxlog"))
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine home directory, using current directory for logs");
            PathBuf::from(".ctxlog")
        })
        .join("logs")
}
