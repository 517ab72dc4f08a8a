use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::entry::CLASS_SUFFIX;

/// Entry prefix under which `.jmod` archives keep their class files.
pub const JMOD_CLASSES_PREFIX: &str = "classes/";

/// Maps `archive_path` read-only and hands the parsed zip directory to `f`.
pub fn with_archive<T>(
    archive_path: &Path,
    f: impl FnOnce(&mut ZipArchive<Cursor<&[u8]>>) -> Result<T>,
) -> Result<T> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    // SAFETY: The file is opened read-only and outlives the mapping, which is
    // dropped at the end of this function.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap archive: {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", archive_path.display()))?;
    f(&mut archive)
}

pub fn archive_contains(archive_path: &Path, entry_name: &str) -> Result<bool> {
    with_archive(archive_path, |archive| Ok(archive.by_name(entry_name).is_ok()))
}

/// Returns the class file for internal name `name` below `dir`, if present.
///
/// Names with empty, `.` or `..` segments never match, so lookups stay
/// inside `dir`.
pub fn directory_class_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let mut path = dir.to_path_buf();
    for segment in name.split('/') {
        if matches!(segment, "" | "." | "..") {
            return None;
        }
        path.push(segment);
    }
    let file_name = path.file_name()?.to_string_lossy().to_string();
    path.set_file_name(format!("{file_name}{CLASS_SUFFIX}"));
    path.is_file().then_some(path)
}

pub fn class_entry_name(name: &str) -> String {
    format!("{name}{CLASS_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn write_jar(path: &Path, entries: &[&str]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for name in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(b"dummy").unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn archive_contains_works() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("lang.jar");
        write_jar(&jar, &["org/apache/commons/lang3/StringUtils.class"]);

        assert!(archive_contains(&jar, "org/apache/commons/lang3/StringUtils.class").unwrap());
        assert!(!archive_contains(&jar, "org/apache/commons/lang3/ArrayUtils.class").unwrap());
    }

    #[test]
    fn archive_contains_fails_on_missing_or_broken_archive() {
        let dir = tempfile::tempdir().unwrap();
        assert!(archive_contains(&dir.path().join("missing.jar"), "A.class").is_err());

        let broken = dir.path().join("broken.jar");
        fs::write(&broken, b"not a zip").unwrap();
        assert!(archive_contains(&broken, "A.class").is_err());
    }

    #[test]
    fn directory_class_file_joins_package_segments() {
        let dir = tempfile::tempdir().unwrap();
        let class = dir.path().join("com/foo/Bar.class");
        fs::create_dir_all(class.parent().unwrap()).unwrap();
        fs::write(&class, b"x").unwrap();

        assert_eq!(directory_class_file(dir.path(), "com/foo/Bar"), Some(class));
        assert_eq!(directory_class_file(dir.path(), "com/foo/Baz"), None);
        assert_eq!(directory_class_file(dir.path(), "com/foo"), None);
    }

    #[test]
    fn directory_class_file_stays_inside_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("classes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(tmp.path().join("Outside.class"), b"x").unwrap();
        fs::write(dir.join("Inside.class"), b"x").unwrap();

        assert_eq!(directory_class_file(&dir, "../Outside"), None);
        assert_eq!(directory_class_file(&dir, "./Inside"), None);
        assert_eq!(directory_class_file(&dir, "a//Inside"), None);
        assert_eq!(directory_class_file(&dir, ""), None);
        assert_eq!(directory_class_file(&dir, "Inside"), Some(dir.join("Inside.class")));
    }
}
