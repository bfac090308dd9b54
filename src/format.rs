//! Entry and file name formatting
//!
//! Pure functions over a timestamp; nothing here reads the clock.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::level::LogLevel;
use crate::source::Source;

/// Time tag prefixed to every entry, e.g. `[14_30_45]`
pub const TIME_TAG_FORMAT: &str = "[%H_%M_%S]";

/// Stem of every log file name, e.g. `2026-01-21 [14_30_45]`
pub const FILE_STAMP_FORMAT: &str = "%Y-%m-%d [%H_%M_%S]";

/// Format a single entry
///
/// Layout: `<time-tag> <LEVEL>: {<source>} >>> <message>`
pub fn format_entry<Tz>(at: &DateTime<Tz>, level: LogLevel, source: &Source, message: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{} {}: {{{}}} >>> {}",
        at.format(TIME_TAG_FORMAT),
        level.as_str(),
        source,
        message
    )
}

/// Build the file name for a log started at `at`
pub fn log_file_name<Tz>(at: &DateTime<Tz>, extension: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}{}", at.format(FILE_STAMP_FORMAT), extension)
}
