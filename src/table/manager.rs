//! Table lifecycle manager
//!
//! Ties the [`StorageManager`] and the [`ResourceFetcher`] together. One
//! `update` call moves through fetch, compare and then install or discard,
//! strictly in that order; nothing touches the cache or the directory while
//! a fetch is in flight.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Serialize;

use super::{DeleteReport, ResourceFetcher, Result, StorageManager, TableError, TableVersionName};
use crate::config::TableConfig;

/// What an [`update`](TableManager::update) call did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// A newer table was written and is now active
    Installed {
        name: TableVersionName,
        path: PathBuf,
    },
    /// The published table is not newer than the active one
    UpToDate { latest: TableVersionName },
    /// No table could be fetched; try again later
    Unavailable,
}

/// Snapshot of the managed tables, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub table_dir: PathBuf,
    pub active: Option<TableVersionName>,
    pub active_path: Option<PathBuf>,
    pub published_at: Option<NaiveDateTime>,
    pub outdated: Vec<TableVersionName>,
}

/// Keeps the local exchange-rate table current
#[derive(Debug)]
pub struct TableManager {
    storage: StorageManager,
    fetcher: ResourceFetcher,
}

impl TableManager {
    /// Opens the configured table directory and prepares the fetcher
    ///
    /// # Returns
    /// * `Err(TableError::Io)` if the table directory cannot be created or read
    pub fn new(config: TableConfig) -> Result<Self> {
        let storage = StorageManager::open(&config.table_dir)?;
        let fetcher = ResourceFetcher::new(config.url, config.timeout)?;
        Ok(Self::from_parts(storage, fetcher))
    }

    /// Builds a manager from an already opened storage manager and fetcher
    pub fn from_parts(storage: StorageManager, fetcher: ResourceFetcher) -> Self {
        Self { storage, fetcher }
    }

    /// The storage manager owning the table directory
    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// The fetcher, including any table it still holds
    pub fn fetcher(&self) -> &ResourceFetcher {
        &self.fetcher
    }

    /// Name of the active table, or `None` before the first download
    pub fn active_table(&self) -> Option<&TableVersionName> {
        self.storage.cache().active()
    }

    /// Absolute path of the table rate lookups should load
    pub fn active_table_path(&self) -> Option<PathBuf> {
        self.storage.active_table_path()
    }

    /// Fetches the published table and installs it if it is newer than the active one
    ///
    /// Fetch failures are logged and reported as [`UpdateOutcome::Unavailable`];
    /// only local write failures surface as errors. With `clean` set, outdated
    /// tables are purged afterwards.
    pub async fn update(&mut self, clean: bool) -> Result<UpdateOutcome> {
        let active = self.storage.cache().active().cloned();

        let fetched = self.fetcher.fetch_latest().await.map(|r| r.name.clone());

        let outcome = match fetched {
            Ok(latest) => {
                if is_newer(&latest, active.as_ref()) {
                    self.install(latest)?
                } else {
                    info!("Existing table already up to date ({})", latest);
                    self.fetcher.clear();
                    UpdateOutcome::UpToDate { latest }
                }
            }
            Err(e) if e.is_fetch_failure() => {
                debug!("Update skipped: {}", e);
                self.fetcher.clear();
                UpdateOutcome::Unavailable
            }
            Err(e) => {
                self.fetcher.clear();
                return Err(e);
            }
        };

        if clean {
            self.cleanup()?;
        }
        Ok(outcome)
    }

    fn install(&mut self, name: TableVersionName) -> Result<UpdateOutcome> {
        let path = match self.fetcher.download_table(self.storage.table_dir()) {
            Ok(path) => path,
            Err(e) => {
                self.fetcher.clear();
                return Err(e);
            }
        };
        self.storage.adopt(name.clone());
        Ok(UpdateOutcome::Installed { name, path })
    }

    /// Deletes every outdated table
    pub fn cleanup(&mut self) -> Result<DeleteReport> {
        self.storage.delete_outdated(false)
    }

    /// Re-reads the table directory, then deletes every table but the newest
    pub fn rescan_and_cleanup(&mut self) -> Result<DeleteReport> {
        self.storage.delete_outdated(true)
    }

    /// Returns the active table path, downloading a first table if there is none
    ///
    /// # Returns
    /// * `Err(TableError::NotFound)` if no table exists and none could be fetched
    pub async fn ensure_table(&mut self) -> Result<PathBuf> {
        if self.active_table().is_none() {
            info!("No exchange-rate table found, downloading one");
            self.update(false).await?;
        }
        self.active_table_path()
            .ok_or_else(|| TableError::NotFound(self.storage.table_dir().to_path_buf()))
    }

    /// Snapshot of the directory, the active table and the outdated tables
    pub fn status(&self) -> TableStatus {
        let cache = self.storage.cache();
        let active = cache.active().cloned();
        TableStatus {
            table_dir: self.storage.table_dir().to_path_buf(),
            published_at: active.as_ref().and_then(TableVersionName::published_at),
            active_path: self.active_table_path(),
            active,
            outdated: cache.outdated().iter().cloned().collect(),
        }
    }
}

/// A fetched table is newer only if its name sorts strictly after the active one
fn is_newer(fetched: &TableVersionName, active: Option<&TableVersionName>) -> bool {
    match active {
        Some(active) => fetched > active,
        None => true,
    }
}
