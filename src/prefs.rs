//! Key/value preference storage.
//!
//! The core only reads and writes semantic values (paths, flags, integers,
//! path lists) through [`PreferenceStore`]. [`LmdbPreferences`] persists them
//! in an LMDB environment via heed; [`MemoryPreferences`] keeps them in memory.

use anyhow::{Context, Result};
use heed::types::Str;
use heed::{Database, Env, EnvFlags, EnvOpenOptions};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::entry::normalize_path;

pub mod keys {
    pub const WORKSPACE_CHOOSER_PATH: &str = "workspaceChooserPath";
    pub const CLASSES_CHOOSER_PATH: &str = "classesChooserPath";
    pub const MODULE_ROOT_CHOOSER_PATH: &str = "moduleRootChooserPath";
    pub const WINDOW_X: &str = "windowX";
    pub const WINDOW_Y: &str = "windowY";
    pub const WINDOW_WIDTH: &str = "windowWidth";
    pub const WINDOW_HEIGHT: &str = "windowHeight";
    pub const WINDOW_MAXIMIZED: &str = "windowMaximized";
    pub const RECENT_WORKSPACES: &str = "recentWorkspaces";
}

const PREFERENCES_DB: &str = "preferences";
const DEFAULT_MAP_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 4;

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;

    fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self
            .get(key)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(default))
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.put(key, if value { "true" } else { "false" })
    }

    fn get_i32(&self, key: &str, default: i32) -> Result<i32> {
        Ok(self
            .get(key)?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default))
    }

    fn put_i32(&self, key: &str, value: i32) -> Result<()> {
        self.put(key, &value.to_string())
    }

    /// Reads a flat sequence stored under `key`; unreadable values read as empty.
    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .get(key)?
            .and_then(|v| serde_json::from_str(&v).ok())
            .unwrap_or_default())
    }

    fn put_list(&self, key: &str, values: &[String]) -> Result<()> {
        self.put(key, &serde_json::to_string(values)?)
    }

    /// Stores `dir` as the starting directory of a file chooser. Empty paths
    /// leave the previous value in place.
    fn remember_directory(&self, key: &str, dir: &Path) -> Result<()> {
        if dir.as_os_str().is_empty() {
            return Ok(());
        }
        self.put(key, &normalize_path(dir).to_string_lossy())
    }
}

#[derive(Debug)]
pub struct LmdbPreferences {
    env: Env,
    db_path: PathBuf,
    values: Database<Str, Str>,
}

impl LmdbPreferences {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let env = open_env(&db_path)?;
        let mut wtxn = env.write_txn()?;
        let values = env.create_database::<Str, Str>(&mut wtxn, Some(PREFERENCES_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            db_path,
            values,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl PreferenceStore for LmdbPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let rtxn = self.env.read_txn()?;
        Ok(self.values.get(&rtxn, key)?.map(str::to_string))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.values.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }
}

fn open_env(db_path: &Path) -> Result<Env> {
    let mut options = EnvOpenOptions::new();
    options.map_size(DEFAULT_MAP_SIZE);
    options.max_dbs(DEFAULT_MAX_DBS);
    // SAFETY: Default LMDB locking stays on. NO_SUB_DIR stores the
    // environment as a single file at `db_path`.
    unsafe {
        options.flags(EnvFlags::NO_SUB_DIR);
        options
            .open(db_path)
            .with_context(|| format!("Failed to create/open preferences env: {}", db_path.display()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_helpers_fall_back_on_garbage() -> Result<()> {
        let store = MemoryPreferences::new();
        store.put(keys::WINDOW_X, "not a number")?;
        store.put(keys::WINDOW_MAXIMIZED, "maybe")?;
        store.put(keys::RECENT_WORKSPACES, "{")?;

        assert_eq!(store.get_i32(keys::WINDOW_X, 7)?, 7);
        assert!(store.get_bool(keys::WINDOW_MAXIMIZED, true)?);
        assert!(store.get_list(keys::RECENT_WORKSPACES)?.is_empty());
        assert_eq!(store.get_or(keys::CLASSES_CHOOSER_PATH, "/home")?, "/home");
        Ok(())
    }

    #[test]
    fn remember_directory_normalizes_and_skips_empty_paths() -> Result<()> {
        let store = MemoryPreferences::new();
        store.remember_directory(keys::MODULE_ROOT_CHOOSER_PATH, Path::new("/jdk/./jmods/"))?;
        store.remember_directory(keys::MODULE_ROOT_CHOOSER_PATH, Path::new(""))?;
        assert_eq!(
            store.get(keys::MODULE_ROOT_CHOOSER_PATH)?.as_deref(),
            Some("/jdk/jmods")
        );
        assert_eq!(store.get(keys::CLASSES_CHOOSER_PATH)?, None);
        Ok(())
    }

    #[test]
    fn lmdb_preferences_persist_across_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("prefs.lmdb");
        {
            let store = LmdbPreferences::open(path.clone())?;
            store.put(keys::WORKSPACE_CHOOSER_PATH, "/work")?;
            store.put_i32(keys::WINDOW_WIDTH, 1024)?;
            store.put_list(keys::RECENT_WORKSPACES, &["/a.cbw".to_string()])?;
        }

        let store = LmdbPreferences::open(path)?;
        assert_eq!(store.get(keys::WORKSPACE_CHOOSER_PATH)?.as_deref(), Some("/work"));
        assert_eq!(store.get_i32(keys::WINDOW_WIDTH, 0)?, 1024);
        assert_eq!(store.get_list(keys::RECENT_WORKSPACES)?, vec!["/a.cbw"]);
        Ok(())
    }
}
