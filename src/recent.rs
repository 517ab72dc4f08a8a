use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::entry::normalize_path;
use crate::prefs::{PreferenceStore, keys};

pub const DEFAULT_CAPACITY: usize = 10;

/// Recently used workspace files, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntries {
    capacity: usize,
    paths: Vec<PathBuf>,
}

impl Default for RecentEntries {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RecentEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            paths: Vec::new(),
        }
    }

    /// Moves `path` to the front, inserting it if new and evicting the oldest
    /// entry beyond capacity.
    pub fn touch(&mut self, path: impl AsRef<Path>) {
        let path = normalize_path(path.as_ref());
        self.paths.retain(|p| *p != path);
        self.paths.insert(0, path);
        self.paths.truncate(self.capacity);
    }

    pub fn remove(&mut self, path: impl AsRef<Path>) -> bool {
        let path = normalize_path(path.as_ref());
        let before = self.paths.len();
        self.paths.retain(|p| *p != path);
        self.paths.len() != before
    }

    pub fn list(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn read(&mut self, store: &dyn PreferenceStore) -> Result<()> {
        let stored = store.get_list(keys::RECENT_WORKSPACES)?;
        self.paths.clear();
        // Oldest first so the stored order survives the moves to the front.
        for path in stored.iter().rev() {
            if !path.is_empty() {
                self.touch(path);
            }
        }
        Ok(())
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<()> {
        let paths: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        store.put_list(keys::RECENT_WORKSPACES, &paths)
    }
}
