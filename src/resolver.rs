//! Class lookup over a [`Classpath`] and classpath root inference.
//!
//! Lookup order follows runtime classpath precedence: directories in
//! insertion order, then archives in insertion order, then modules. The first
//! entry that has the class wins.

use anyhow::Result;
use rayon::prelude::*;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::classfile::read_this_class_name_from_file;
use crate::classpath::Classpath;
use crate::entry::{ClassLocation, class_path_name, normalize_path, split_module_prefix};
use crate::error::BrowserError;
use crate::probe::{JMOD_CLASSES_PREFIX, archive_contains, class_entry_name, directory_class_file};

/// Result of opening a standalone class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedClass {
    pub location: ClassLocation,
    /// Internal name read from the class file header, when readable.
    pub class_name: Option<String>,
    /// Classpath root registered for the file, when its layout matched.
    pub root: Option<PathBuf>,
}

/// Finds the class `qualified_name` (dotted or internal form).
///
/// Modules are only searched when no directory or archive has the class.
/// With `prefer_module_path`, a leading `module.name/` restricts the module
/// tier to that module.
pub fn find_class(
    classpath: &Classpath,
    qualified_name: &str,
    prefer_module_path: bool,
) -> Option<ClassLocation> {
    let requested = class_path_name(qualified_name);
    let (module_hint, name) = if prefer_module_path {
        split_module_prefix(&requested)
    } else {
        (None, requested.as_str())
    };
    if name.is_empty() {
        return None;
    }

    let found = find_in_directories(classpath, name).or_else(|| find_in_archives(classpath, name));
    if found.is_some() {
        return found;
    }
    let found = find_in_modules(classpath, name, module_hint);
    if found.is_none() {
        tracing::debug!(class = name, entries = classpath.len(), "class not found on classpath");
    }
    found
}

fn find_in_directories(classpath: &Classpath, name: &str) -> Option<ClassLocation> {
    classpath
        .directories()
        .find_map(|dir| directory_class_file(dir, name))
        .map(ClassLocation::file)
}

fn find_in_archives(classpath: &Classpath, name: &str) -> Option<ClassLocation> {
    let entry_name = class_entry_name(name);
    let archives: Vec<&Path> = classpath.archives().collect();
    archives.par_iter().find_map_first(|archive| {
        probe_archive(archive, &entry_name).then(|| ClassLocation::in_archive(archive, &entry_name))
    })
}

fn find_in_modules(
    classpath: &Classpath,
    name: &str,
    module_hint: Option<&str>,
) -> Option<ClassLocation> {
    let root = classpath.module_root()?;
    classpath
        .modules()
        .filter(|module| module_hint.is_none_or(|hint| hint == *module))
        .find_map(|module| {
            if let Some(file) = directory_class_file(&root.join(module), name) {
                return Some(ClassLocation::file(file).with_module(module));
            }
            let jmod = root.join(format!("{module}.jmod"));
            let entry_name = format!("{JMOD_CLASSES_PREFIX}{}", class_entry_name(name));
            probe_archive(&jmod, &entry_name)
                .then(|| ClassLocation::in_archive(&jmod, &entry_name).with_module(module))
        })
}

fn probe_archive(archive: &Path, entry_name: &str) -> bool {
    match archive_contains(archive, entry_name) {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!(archive = %archive.display(), error = %e, "skipping unreadable archive");
            false
        }
    }
}

/// Derives the classpath root of `opened_file` from its package structure.
///
/// Each parent directory, innermost first, must be named after the matching
/// package segment of `qualified_name`. Returns the directory above the
/// package chain, or `None` when the layout does not match.
pub fn infer_root_directory(opened_file: &Path, qualified_name: &str) -> Option<PathBuf> {
    let name = class_path_name(qualified_name);
    let segments: Vec<&str> = name.split('/').collect();
    let (_, packages) = segments.split_last()?;

    let opened_file = normalize_path(opened_file);
    let mut current = opened_file.parent()?;
    for segment in packages.iter().rev() {
        if current.file_name() != Some(OsStr::new(segment)) {
            return None;
        }
        current = current.parent()?;
    }

    if current.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(current.to_path_buf())
    }
}

/// Opens a class file from disk and registers its root on `classpath`.
///
/// An unparseable header or a non-standard directory layout only skips the
/// classpath enrichment. Failing to read the file at all is an error.
pub fn open_class_file(classpath: &mut Classpath, path: &Path) -> Result<OpenedClass, BrowserError> {
    let location = ClassLocation::file(path);
    let class_name = match read_this_class_name_from_file(path) {
        Ok(name) => Some(name),
        Err(e @ BrowserError::Storage { .. }) => return Err(e),
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "class name unavailable");
            None
        }
    };

    let root = class_name
        .as_deref()
        .and_then(|name| infer_root_directory(path, name));
    match &root {
        Some(root) => {
            classpath.add_directory(root);
        }
        None => tracing::debug!(file = %path.display(), "no classpath root inferred"),
    }

    Ok(OpenedClass {
        location,
        class_name,
        root,
    })
}

/// Opens `class_name` from `archive` and registers the archive on `classpath`.
///
/// Returns `Ok(None)` and leaves the classpath alone when the archive has no
/// such class.
pub fn open_archive_class(
    classpath: &mut Classpath,
    archive: &Path,
    class_name: &str,
) -> Result<Option<ClassLocation>> {
    let requested = class_path_name(class_name);
    let (module, name) = split_module_prefix(&requested);
    let is_jmod = archive
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("jmod"));
    let entry_name = if is_jmod {
        format!("{JMOD_CLASSES_PREFIX}{}", class_entry_name(name))
    } else {
        class_entry_name(name)
    };

    if !archive_contains(archive, &entry_name)? {
        return Ok(None);
    }
    classpath.add_archive(archive);
    let location = ClassLocation::in_archive(normalize_path(archive), &entry_name);
    Ok(Some(match module {
        Some(module) => location.with_module(module),
        None => location,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::tests::class_bytes;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn write_jar(path: &Path, entries: &[&str]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for name in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(b"dummy").unwrap();
        }
        zip.finish().unwrap();
    }

    fn write_class(path: &Path, name: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, class_bytes(name)).unwrap();
    }

    #[test]
    fn directory_wins_over_archive_added_later() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("classes");
        write_class(&dir.join("X.class"), "X");
        let jar = tmp.path().join("x.jar");
        write_jar(&jar, &["X.class"]);

        let mut cp = Classpath::new();
        cp.add_directory(&dir);
        cp.add_archive(&jar);

        let found = find_class(&cp, "X", false).unwrap();
        assert_eq!(found, ClassLocation::file(dir.join("X.class")));
    }

    #[test]
    fn directory_tier_beats_archive_inserted_first() {
        let tmp = tempfile::tempdir().unwrap();
        let jar = tmp.path().join("x.jar");
        write_jar(&jar, &["com/foo/X.class"]);
        let dir = tmp.path().join("classes");
        write_class(&dir.join("com/foo/X.class"), "com/foo/X");

        let mut cp = Classpath::new();
        cp.add_archive(&jar);
        cp.add_directory(&dir);

        let found = find_class(&cp, "com.foo.X", false).unwrap();
        assert_eq!(found.file_name, dir.join("com/foo/X.class").to_string_lossy());
    }

    #[test]
    fn earliest_archive_wins_and_broken_archives_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let broken = tmp.path().join("broken.jar");
        std::fs::write(&broken, b"garbage").unwrap();
        let first = tmp.path().join("first.jar");
        let second = tmp.path().join("second.jar");
        write_jar(&first, &["a/Other.class"]);
        write_jar(&second, &["a/X.class"]);
        let third = tmp.path().join("third.jar");
        write_jar(&third, &["a/X.class"]);

        let mut cp = Classpath::new();
        cp.add_archive(&broken);
        cp.add_archive(&first);
        cp.add_archive(&second);
        cp.add_archive(&third);

        let found = find_class(&cp, "a/X", false).unwrap();
        assert_eq!(found, ClassLocation::in_archive(&second, "a/X.class"));
        assert_eq!(found.archive_parts().unwrap().0, second);
    }

    #[test]
    fn missing_class_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let jar = tmp.path().join("x.jar");
        write_jar(&jar, &["a/X.class"]);
        let mut cp = Classpath::new();
        cp.add_archive(&jar);
        cp.add_directory(tmp.path().join("nope"));
        cp.add_module("java.base");

        assert_eq!(find_class(&cp, "a.Y", false), None);
        assert_eq!(find_class(&cp, "a.Y", true), None);
        assert_eq!(find_class(&Classpath::new(), "a.X", false), None);
    }

    #[test]
    fn module_tier_is_searched_last() {
        let tmp = tempfile::tempdir().unwrap();
        let jmods = tmp.path().join("jmods");
        write_jar(&jmods.join("java.base.jmod"), &["classes/java/lang/Object.class"]);
        let exploded = jmods.join("java.sql/java/sql/Driver.class");
        write_class(&exploded, "java/sql/Driver");
        let shadow = tmp.path().join("shadow.jar");
        write_jar(&shadow, &["java/lang/Object.class"]);

        let mut cp = Classpath::new();
        cp.add_module("java.base");
        cp.add_module("java.sql");
        cp.set_module_root(Some(&jmods));

        let object = find_class(&cp, "java.lang.Object", false).unwrap();
        assert_eq!(object.module_name.as_deref(), Some("java.base"));
        assert!(object.file_name.ends_with("java.base.jmod!classes/java/lang/Object.class"));

        let driver = find_class(&cp, "java.base/java/sql/Driver", true);
        assert_eq!(driver, None);
        let driver = find_class(&cp, "java.sql/java/sql/Driver", true).unwrap();
        assert_eq!(driver, ClassLocation::file(&exploded).with_module("java.sql"));

        cp.add_archive(&shadow);
        let object = find_class(&cp, "java/lang/Object", true).unwrap();
        assert_eq!(object, ClassLocation::in_archive(&shadow, "java/lang/Object.class"));
    }

    #[test]
    fn relative_segments_do_not_escape_classpath_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("classes");
        std::fs::create_dir_all(&dir).unwrap();
        write_class(&tmp.path().join("x.class"), "x");

        let mut cp = Classpath::new();
        cp.add_directory(&dir);
        assert_eq!(find_class(&cp, "../x", false), None);
    }

    #[test]
    fn module_entries_without_root_find_nothing() {
        let mut cp = Classpath::new();
        cp.add_module("java.base");
        assert_eq!(find_class(&cp, "java.lang.Object", true), None);
    }

    #[test]
    fn infer_root_directory_matches_package_chain() {
        assert_eq!(
            infer_root_directory(Path::new("/root/com/foo/Bar.class"), "com/foo/Bar"),
            Some(PathBuf::from("/root"))
        );
        assert_eq!(
            infer_root_directory(Path::new("/root/Bar.class"), "Bar"),
            Some(PathBuf::from("/root"))
        );
        assert_eq!(
            infer_root_directory(Path::new("com/foo/Bar.class"), "com.foo.Bar"),
            Some(PathBuf::from("."))
        );
    }

    #[test]
    fn infer_root_directory_rejects_non_standard_layout() {
        assert_eq!(
            infer_root_directory(Path::new("/root/wrong/foo/Bar.class"), "com/foo/Bar"),
            None
        );
        assert_eq!(
            infer_root_directory(Path::new("/root/com/bar/Bar.class"), "com/foo/Bar"),
            None
        );
        assert_eq!(infer_root_directory(Path::new("/foo/Bar.class"), "a/b/c/foo/Bar"), None);
    }

    #[test]
    fn open_class_file_registers_inferred_root() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("out/com/foo/Bar.class");
        write_class(&file, "com/foo/Bar");

        let mut cp = Classpath::new();
        let opened = open_class_file(&mut cp, &file).unwrap();
        let root = normalize_path(&tmp.path().join("out"));
        assert_eq!(opened.class_name.as_deref(), Some("com/foo/Bar"));
        assert_eq!(opened.root.as_deref(), Some(root.as_path()));
        assert_eq!(cp.directories().collect::<Vec<_>>(), vec![root.as_path()]);

        open_class_file(&mut cp, &file).unwrap();
        assert_eq!(cp.len(), 1);
    }

    #[test]
    fn open_class_file_from_misplaced_file_adds_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("downloads/Bar.class");
        write_class(&file, "com/foo/Bar");
        let garbage = tmp.path().join("Garbage.class");
        std::fs::write(&garbage, b"nope").unwrap();

        let mut cp = Classpath::new();
        let opened = open_class_file(&mut cp, &file).unwrap();
        assert_eq!(opened.root, None);
        let opened = open_class_file(&mut cp, &garbage).unwrap();
        assert_eq!(opened.class_name, None);
        assert!(cp.is_empty());

        assert!(matches!(
            open_class_file(&mut cp, &tmp.path().join("missing.class")),
            Err(BrowserError::Storage { .. })
        ));
    }

    #[test]
    fn open_archive_class_registers_archive_only_on_hit() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let jar = tmp.path().join("lib.jar");
        write_jar(&jar, &["a/X.class"]);

        let mut cp = Classpath::new();
        assert_eq!(open_archive_class(&mut cp, &jar, "a.Y")?, None);
        assert!(cp.is_empty());

        let location = open_archive_class(&mut cp, &jar, "a.X")?.unwrap();
        assert_eq!(location.file_name, format!("{}!a/X.class", jar.display()));
        assert_eq!(cp.archives().collect::<Vec<_>>(), vec![jar.as_path()]);
        Ok(())
    }
}
