use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::store::workspace_file;

pub const HOME_ENV: &str = "CLASS_BROWSER_HOME";
pub const LOG_ENV: &str = "CLASS_BROWSER_LOG";

pub fn resolve_home(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.home.clone() {
        return Ok(p);
    }

    if let Ok(p) = env::var(HOME_ENV)
        && !p.trim().is_empty()
    {
        return Ok(PathBuf::from(p));
    }

    class_browser_home()
}

pub fn resolve_workspace_path(cli: &Cli, home: &Path) -> PathBuf {
    match cli.workspace.as_deref() {
        Some(p) => workspace_file(p),
        None => default_workspace_path(home),
    }
}

pub fn default_workspace_path(home: &Path) -> PathBuf {
    workspace_file(&home.join("workspace"))
}

pub fn prefs_db_path(home: &Path) -> PathBuf {
    home.join("prefs.lmdb")
}

fn class_browser_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("class-browser"))
}
