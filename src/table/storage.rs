//! Storage manager for exchange-rate table files
//!
//! Owns one directory on disk. The directory listing is the persisted state:
//! every file following the table naming pattern is a cached table, the
//! lexicographically greatest one is active and the rest are outdated.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use super::{is_partial_file_name, Result, TableError, TableVersionName, VersionCache};

/// Outcome of purging outdated tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Files removed from disk
    pub deleted: Vec<TableVersionName>,
    /// Files that were already gone (counted as success)
    pub already_missing: Vec<TableVersionName>,
    /// Files that could not be removed, with the reason
    pub failed: Vec<(TableVersionName, String)>,
}

impl DeleteReport {
    /// True when every outdated table is gone from disk
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Bridges the [`VersionCache`] and the files in the table directory
#[derive(Debug)]
pub struct StorageManager {
    /// Absolute path of the managed directory
    table_dir: PathBuf,
    cache: VersionCache,
}

impl StorageManager {
    /// Opens (creating if needed) the table directory and inventories it
    ///
    /// # Returns
    /// * `Err(TableError::Io)` if the directory cannot be created or listed
    pub fn open(table_dir: impl AsRef<Path>) -> Result<Self> {
        let table_dir = table_dir.as_ref();
        fs::create_dir_all(table_dir).map_err(|e| TableError::io(table_dir, e))?;
        let table_dir = fs::canonicalize(table_dir).map_err(|e| TableError::io(table_dir, e))?;

        let mut storage = Self {
            table_dir,
            cache: VersionCache::new(),
        };
        storage.reinitialize()?;
        Ok(storage)
    }

    /// Re-derives the active and outdated tables from the directory listing
    ///
    /// Discards whatever the in-memory cache believed before, and removes
    /// leftover `.part` files from interrupted downloads.
    pub fn reinitialize(&mut self) -> Result<()> {
        fs::create_dir_all(&self.table_dir).map_err(|e| TableError::io(&self.table_dir, e))?;
        let (inventory, partials) = self.inventory()?;
        Self::remove_partials(&partials);

        self.cache.clear_active();
        let newest = inventory.iter().next_back().cloned();
        self.cache.set_outdated(inventory);
        if let Some(newest) = newest {
            self.cache.set_active(newest);
        }

        debug!(
            "Inventoried {}: active={}, outdated={}",
            self.table_dir.display(),
            self.cache.active().map(|n| n.as_str()).unwrap_or("<none>"),
            self.cache.outdated().len()
        );
        Ok(())
    }

    /// Lists table files in the directory, skipping anything off-pattern
    ///
    /// # Returns
    /// * The table names found, plus paths of leftover partial downloads
    fn inventory(&self) -> Result<(BTreeSet<TableVersionName>, Vec<PathBuf>)> {
        let entries = fs::read_dir(&self.table_dir).map_err(|e| TableError::io(&self.table_dir, e))?;

        let mut names = BTreeSet::new();
        let mut partials = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TableError::io(&self.table_dir, e))?;
            let path = entry.path();
            // Follows symlinks, so a linked table still counts
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if is_partial_file_name(&file_name) {
                partials.push(path);
                continue;
            }
            match TableVersionName::new(file_name) {
                Ok(name) if name.is_table_file() => {
                    names.insert(name);
                }
                _ => {}
            }
        }
        Ok((names, partials))
    }

    /// Removes downloads that were never renamed into place
    fn remove_partials(partials: &[PathBuf]) {
        for path in partials {
            match fs::remove_file(path) {
                Ok(()) => info!("Removed unfinished download {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove unfinished download {}: {}", path.display(), e),
            }
        }
    }

    /// Absolute path of `name` inside the table directory; existence is not checked
    pub fn resolve_path(&self, name: &TableVersionName) -> PathBuf {
        self.table_dir.join(name.as_str())
    }

    /// Absolute path of the active table, if there is one
    pub fn active_table_path(&self) -> Option<PathBuf> {
        self.cache.active().map(|name| self.resolve_path(name))
    }

    /// Absolute path of the managed directory
    pub fn table_dir(&self) -> &Path {
        &self.table_dir
    }

    /// Names of the active and outdated tables as currently tracked
    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    /// Marks a table that has just been written to the directory as active
    pub fn adopt(&mut self, name: TableVersionName) {
        info!("Active table is now {}", name);
        self.cache.set_active(name);
    }

    /// Deletes every outdated table from disk, then clears the outdated set
    ///
    /// With `force_rescan` the directory is inventoried first, so files the
    /// cache did not know about are purged too. Missing files count as deleted;
    /// other failures are logged and reported but do not stop the batch.
    pub fn delete_outdated(&mut self, force_rescan: bool) -> Result<DeleteReport> {
        if force_rescan {
            self.reinitialize()?;
        }

        let mut report = DeleteReport::default();
        for name in self.cache.outdated() {
            let path = self.resolve_path(name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Deleted outdated table {}", path.display());
                    report.deleted.push(name.clone());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Outdated table {} already gone", path.display());
                    report.already_missing.push(name.clone());
                }
                Err(e) => {
                    warn!("Failed to delete outdated table {}: {}", path.display(), e);
                    report.failed.push((name.clone(), e.to_string()));
                }
            }
        }
        self.cache.clear_outdated();

        if report.deleted.is_empty() && report.already_missing.is_empty() && report.failed.is_empty() {
            info!("No outdated tables detected");
        } else {
            info!(
                "Purged {} outdated table(s), {} already missing, {} failed",
                report.deleted.len(),
                report.already_missing.len(),
                report.failed.len()
            );
        }
        Ok(report)
    }
}
