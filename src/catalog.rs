//! Class listings for classpath entries, used to populate a class chooser.

use anyhow::Result;
use ignore::WalkBuilder;
use serde::Serialize;
use std::path::Path;

use crate::classpath::Classpath;
use crate::entry::{CLASS_SUFFIX, ClasspathEntry};
use crate::probe::{JMOD_CLASSES_PREFIX, with_archive};

#[derive(Debug, Clone, Serialize)]
pub struct EntryListing {
    pub entry: ClasspathEntry,
    pub classes: Vec<String>,
}

/// Top-level classes in an archive, in internal form, sorted.
pub fn list_archive_classes(archive_path: &Path) -> Result<Vec<String>> {
    list_archive_classes_under(archive_path, "")
}

fn list_archive_classes_under(archive_path: &Path, prefix: &str) -> Result<Vec<String>> {
    with_archive(archive_path, |archive| {
        let mut classes = Vec::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let Some(name) = entry.name().strip_prefix(prefix) else {
                continue;
            };
            if let Some(class) = top_level_class(name) {
                classes.push(class);
            }
        }
        classes.sort();
        classes.dedup();
        Ok(classes)
    })
}

/// Top-level classes below a directory root, in internal form, sorted.
pub fn list_directory_classes(root: &Path) -> Vec<String> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build();

    let mut classes = Vec::new();
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if let Some(class) = top_level_class(&name) {
            classes.push(class);
        }
    }
    classes.sort();
    classes
}

/// Lists every entry of `classpath` in classpath order.
///
/// Unreadable entries yield an empty listing rather than failing the whole
/// browse.
pub fn list_classes(classpath: &Classpath) -> Vec<EntryListing> {
    classpath
        .entries()
        .iter()
        .map(|entry| {
            let classes = match entry {
                ClasspathEntry::Directory { path } => list_directory_classes(path),
                ClasspathEntry::Archive { path } => list_archive_classes(path).unwrap_or_else(|e| {
                    tracing::debug!(archive = %path.display(), error = %e, "archive not listable");
                    Vec::new()
                }),
                ClasspathEntry::Module { name } => list_module_classes(classpath.module_root(), name),
            };
            EntryListing {
                entry: entry.clone(),
                classes,
            }
        })
        .collect()
}

fn list_module_classes(module_root: Option<&Path>, module: &str) -> Vec<String> {
    let Some(root) = module_root else {
        return Vec::new();
    };
    let exploded = root.join(module);
    if exploded.is_dir() {
        return list_directory_classes(&exploded);
    }
    let jmod = root.join(format!("{module}.jmod"));
    list_archive_classes_under(&jmod, JMOD_CLASSES_PREFIX).unwrap_or_default()
}

fn top_level_class(entry_name: &str) -> Option<String> {
    let name = entry_name.strip_suffix(CLASS_SUFFIX)?;
    if name.is_empty() || name.contains('$') {
        return None;
    }
    if name.ends_with("module-info") || name.ends_with("package-info") {
        return None;
    }
    Some(name.replace('\\', "/"))
}
