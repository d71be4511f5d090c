//! Configuration for the table lifecycle manager

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

/// Endpoint publishing the Bank of Taiwan exchange-rate table as CSV
pub const DEFAULT_URL: &str = "https://rate.bot.com.tw/xrt/flcsv/0/day?Lang=en-US";

/// Name of the directory holding downloaded tables
pub const TABLE_FOLDER: &str = "exchange-rate-tables";

/// Environment variable overriding the endpoint URL
pub const URL_ENV: &str = "CVTWD_URL";

/// Environment variable overriding the table directory
pub const TABLE_DIR_ENV: &str = "CVTWD_TABLE_DIR";

/// Where tables come from and where they are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Endpoint serving the latest table
    pub url: String,
    /// Directory holding downloaded tables
    pub table_dir: PathBuf,
    /// Request timeout for fetching a table
    pub timeout: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            table_dir: default_table_dir(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TableConfig {
    /// Defaults, overridden by `CVTWD_URL` and `CVTWD_TABLE_DIR` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env::var(URL_ENV).ok().filter(|v| !v.is_empty()) {
            config.url = url;
        }
        if let Some(dir) = env::var_os(TABLE_DIR_ENV).filter(|v| !v.is_empty()) {
            config.table_dir = PathBuf::from(dir);
        }
        config
    }

    /// Overrides the endpoint serving the latest table
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Overrides the directory holding downloaded tables
    pub fn with_table_dir(mut self, table_dir: impl Into<PathBuf>) -> Self {
        self.table_dir = table_dir.into();
        self
    }

    /// Overrides the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// XDG data directory (`~/.local/share/cvtwd/exchange-rate-tables` on Linux),
/// or `./exchange-rate-tables` when no home directory is available
fn default_table_dir() -> PathBuf {
    ProjectDirs::from("", "", "cvtwd")
        .map(|dirs| dirs.data_dir().join(TABLE_FOLDER))
        .unwrap_or_else(|| PathBuf::from(TABLE_FOLDER))
}
