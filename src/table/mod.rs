//! Exchange-rate table lifecycle
//!
//! Keeps exactly one downloaded table active, fetches newer ones from the
//! published endpoint and purges the superseded files. Table file names
//! (`ExchangeRate@YYYYMMDDHHMM.csv`) double as version identifiers.

mod cache;
mod error;
mod fetcher;
mod manager;
mod storage;
mod version;

pub use cache::VersionCache;
pub use error::{Result, TableError};
pub use fetcher::{FetchedResource, ResourceFetcher};
pub use manager::{TableManager, TableStatus, UpdateOutcome};
pub use storage::{DeleteReport, StorageManager};
pub use version::{is_partial_file_name, is_table_file_name, TableVersionName};
