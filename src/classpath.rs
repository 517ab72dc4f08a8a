use std::path::{Path, PathBuf};

use crate::entry::{ClasspathEntry, normalize_path};

/// Ordered, duplicate-free list of classpath entries.
///
/// Entries keep their insertion order, which is also the search order within
/// each entry kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<ClasspathEntry>,
    module_root: Option<PathBuf>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ClasspathEntry>) -> Self {
        let mut classpath = Self::new();
        for entry in entries {
            classpath.add(entry);
        }
        classpath
    }

    pub fn add_directory(&mut self, path: impl AsRef<Path>) -> bool {
        self.add(ClasspathEntry::directory(path))
    }

    pub fn add_archive(&mut self, path: impl AsRef<Path>) -> bool {
        self.add(ClasspathEntry::archive(path))
    }

    pub fn add_module(&mut self, name: impl AsRef<str>) -> bool {
        let entry = ClasspathEntry::module(name);
        if matches!(&entry, ClasspathEntry::Module { name } if name.is_empty()) {
            return false;
        }
        self.add(entry)
    }

    /// Appends `entry` unless an equal entry (after normalization) is present.
    pub fn add(&mut self, entry: ClasspathEntry) -> bool {
        let entry = match entry {
            ClasspathEntry::Directory { path } => ClasspathEntry::directory(path),
            ClasspathEntry::Archive { path } => ClasspathEntry::archive(path),
            ClasspathEntry::Module { name } => ClasspathEntry::module(name),
        };
        if self.entries.contains(&entry) {
            return false;
        }
        tracing::debug!(kind = entry.kind(), entry = %entry.label(), "classpath entry added");
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, entry: &ClasspathEntry) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != entry);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.module_root = None;
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().filter_map(|e| match e {
            ClasspathEntry::Directory { path } => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn archives(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().filter_map(|e| match e {
            ClasspathEntry::Archive { path } => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            ClasspathEntry::Module { name } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn module_root(&self) -> Option<&Path> {
        self.module_root.as_deref()
    }

    pub fn set_module_root(&mut self, root: Option<&Path>) {
        self.module_root = root.map(normalize_path);
    }
}
