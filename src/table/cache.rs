//! In-memory record of which table is active and which are outdated

use std::collections::BTreeSet;

use super::{Result, TableVersionName};

/// Tracks the active table name and the set of superseded names
///
/// The active name is never a member of the outdated set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCache {
    active: Option<TableVersionName>,
    outdated: BTreeSet<TableVersionName>,
}

impl VersionCache {
    /// Creates an empty cache: no active table, nothing outdated
    pub fn new() -> Self {
        Self::default()
    }

    /// The active table name, or `None` when no table has been adopted
    pub fn active(&self) -> Option<&TableVersionName> {
        self.active.as_ref()
    }

    /// Superseded table names awaiting purge
    pub fn outdated(&self) -> &BTreeSet<TableVersionName> {
        &self.outdated
    }

    /// Promotes `name` to active, demoting the previous active name to outdated
    ///
    /// Re-activating the current name is a no-op.
    pub fn set_active(&mut self, name: TableVersionName) {
        if self.active.as_ref() == Some(&name) {
            return;
        }
        // A name coming back from the outdated set is active again, not both.
        self.outdated.remove(&name);
        if let Some(previous) = self.active.replace(name) {
            self.outdated.insert(previous);
        }
    }

    /// Validating variant of [`set_active`](Self::set_active) for raw strings
    ///
    /// # Returns
    /// * `Err(TableError::InvalidArgument)` if `name` is empty or not a plain file name
    pub fn set_active_str(&mut self, name: &str) -> Result<()> {
        self.set_active(TableVersionName::new(name)?);
        Ok(())
    }

    /// Replaces the outdated set wholesale
    pub fn set_outdated(&mut self, mut names: BTreeSet<TableVersionName>) {
        if let Some(active) = &self.active {
            names.remove(active);
        }
        self.outdated = names;
    }

    /// Forgets every outdated name, typically after they were deleted
    pub fn clear_outdated(&mut self) {
        self.outdated.clear();
    }

    /// Forgets the active name without demoting it
    pub fn clear_active(&mut self) {
        self.active = None;
    }
}
