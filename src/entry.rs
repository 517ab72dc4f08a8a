use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const CLASS_SUFFIX: &str = ".class";
pub const ARCHIVE_SEPARATOR: char = '!';

/// A source searched when resolving a class by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClasspathEntry {
    Directory { path: PathBuf },
    Archive { path: PathBuf },
    Module { name: String },
}

impl ClasspathEntry {
    pub fn directory(path: impl AsRef<Path>) -> Self {
        Self::Directory {
            path: normalize_path(path.as_ref()),
        }
    }

    pub fn archive(path: impl AsRef<Path>) -> Self {
        Self::Archive {
            path: normalize_path(path.as_ref()),
        }
    }

    pub fn module(name: impl AsRef<str>) -> Self {
        Self::Module {
            name: name.as_ref().trim().to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Directory { .. } => "directory",
            Self::Archive { .. } => "archive",
            Self::Module { .. } => "module",
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Directory { path } | Self::Archive { path } => Some(path),
            Self::Module { .. } => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Directory { path } | Self::Archive { path } => path.to_string_lossy().to_string(),
            Self::Module { name } => name.clone(),
        }
    }
}

/// Where the bytes of a class live.
///
/// Classes inside an archive use the form `<archive>!<internal/Name>.class`,
/// classes on the filesystem use a plain path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLocation {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
}

impl ClassLocation {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            file_name: path.as_ref().to_string_lossy().to_string(),
            module_name: None,
        }
    }

    pub fn in_archive(archive: impl AsRef<Path>, entry_name: &str) -> Self {
        Self {
            file_name: format!(
                "{}{ARCHIVE_SEPARATOR}{entry_name}",
                archive.as_ref().to_string_lossy()
            ),
            module_name: None,
        }
    }

    pub fn with_module(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    /// Splits an archive location into the archive path and the entry name.
    pub fn archive_parts(&self) -> Option<(PathBuf, &str)> {
        let (archive, entry) = self.file_name.rsplit_once(ARCHIVE_SEPARATOR)?;
        if archive.is_empty() || !entry.ends_with(CLASS_SUFFIX) {
            return None;
        }
        Some((PathBuf::from(archive), entry))
    }
}

/// File types the browser knows how to open, decided once from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Class,
    Archive,
    Workspace,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "class" => Self::Class,
            "jar" | "zip" | "jmod" => Self::Archive,
            crate::store::WORKSPACE_FILE_SUFFIX => Self::Workspace,
            _ => Self::Other,
        }
    }
}

/// Lexically normalizes a path: drops `.` and trailing separators, folds `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Converts `a.b.C`, `a/b/C` or `a/b/C.class` to the internal form `a/b/C`.
pub fn class_path_name(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix(CLASS_SUFFIX).unwrap_or(trimmed);
    if trimmed.contains('/') {
        trimmed.to_string()
    } else {
        trimmed.replace('.', "/")
    }
}

/// Splits an optional `module/` prefix off a module-path class name.
///
/// Module names contain dots but no slashes, so the prefix is only recognized
/// when the first segment has a dot and the remainder is in internal form.
pub fn split_module_prefix(name: &str) -> (Option<&str>, &str) {
    match name.split_once('/') {
        Some((module, rest)) if module.contains('.') && rest.contains('/') => (Some(module), rest),
        _ => (None, name),
    }
}
