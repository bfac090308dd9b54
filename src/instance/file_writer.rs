//! Log file naming and the final flush to disk

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::LogError;
use crate::format::log_file_name;

/// Generate a timestamped log file path inside `folder`
///
/// If a file with the timestamped name already exists (an instance flushed
/// earlier in the same second), an `_n` counter is inserted before the
/// extension. `_` sorts after `.`, so name order stays chronological.
pub fn create_log_file_path(folder: &Path, extension: &str) -> PathBuf {
    let name = log_file_name(&Local::now(), extension);
    disambiguate(folder, &name, extension)
}

fn disambiguate(folder: &Path, name: &str, extension: &str) -> PathBuf {
    let path = folder.join(name);
    if !path.exists() {
        return path;
    }

    let stem = name.strip_suffix(extension).unwrap_or(name);
    (2..)
        .map(|n| folder.join(format!("{}_{}{}", stem, n, extension)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}

/// Write `contents` to `path`, replacing any existing file
///
/// The file is opened, written, and closed within this call.
pub fn write_log_file(path: &Path, contents: &str) -> Result<(), LogError> {
    let to_error = |source| LogError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(to_error)?;
    file.write_all(contents.as_bytes()).map_err(to_error)?;
    file.flush().map_err(to_error)?;
    Ok(())
}
