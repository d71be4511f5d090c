//! Table version names
//!
//! A table file's name doubles as its version identifier. Published names
//! embed a fixed-width `YYYYMMDDHHMM` timestamp, so ordinary string ordering
//! is chronological ordering.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

use super::{Result, TableError};

/// Format of the timestamp embedded after the `@` in a table file name
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

fn table_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@/\\\s]+@(\d{12})(\.[A-Za-z0-9]+)?$").expect("valid table file pattern")
    })
}

/// Returns true when `name` follows the `<prefix>@<YYYYMMDDHHMM>[.<ext>]` pattern
pub fn is_table_file_name(name: &str) -> bool {
    table_file_pattern().is_match(name)
}

/// Returns true for the temporary files a download writes before renaming
/// them into place, e.g. `.ExchangeRate@201912201451.csv.part`
pub fn is_partial_file_name(name: &str) -> bool {
    name.strip_prefix('.')
        .and_then(|rest| rest.strip_suffix(".part"))
        .is_some_and(is_table_file_name)
}

/// Name of one table snapshot, e.g. `ExchangeRate@201912201451.csv`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TableVersionName(String);

impl TableVersionName {
    /// Creates a version name, rejecting anything that cannot be a plain file name
    ///
    /// # Returns
    /// * `Err(TableError::InvalidArgument)` for empty names, `.`/`..`, names
    ///   containing path separators, whitespace or control characters
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TableError::InvalidArgument(
                "table name must not be empty".to_string(),
            ));
        }
        if name == "." || name == ".." {
            return Err(TableError::InvalidArgument(format!(
                "'{}' is not a table name",
                name
            )));
        }
        if name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
        {
            return Err(TableError::InvalidArgument(format!(
                "table name '{}' must be a plain file name",
                name
            )));
        }
        Ok(Self(name))
    }

    /// Name of the temporary file a download of this table is written to
    pub fn partial_file_name(&self) -> String {
        format!(".{}.part", self.0)
    }

    /// The name as stored on disk
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name follows the published table file pattern
    pub fn is_table_file(&self) -> bool {
        is_table_file_name(&self.0)
    }

    /// Publication time embedded in the name, for display only
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        let captures = table_file_pattern().captures(&self.0)?;
        NaiveDateTime::parse_from_str(captures.get(1)?.as_str(), TIMESTAMP_FORMAT).ok()
    }
}

impl fmt::Display for TableVersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableVersionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
