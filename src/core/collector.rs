//! Project file collection.
//!
//! Walks the project root depth-first and accumulates every matching file
//! straight into a flat, path-sorted map. Hidden entries and excluded names
//! are pruned with their whole subtree, at any depth.

use crate::core::error::{Error, Result};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A single collected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path as walked, i.e. the root joined with the relative path.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
}

/// Flat mapping from file path to content, iterated in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFileSet {
    files: BTreeMap<PathBuf, String>,
}

impl ProjectFileSet {
    /// Creates an empty file set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, replacing any previous content stored under its path.
    pub fn insert(&mut self, record: FileRecord) {
        self.files.insert(record.path, record.content);
    }

    /// Number of collected files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Content of the file at `path`, if it was collected.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Returns true if `path` was collected.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Iterates over collected paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Iterates over `(path, content)` pairs in sorted order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.files.iter(),
        }
    }
}

impl FromIterator<FileRecord> for ProjectFileSet {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ProjectFileSet {
    type Item = (&'a Path, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`ProjectFileSet`].
#[derive(Debug)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, PathBuf, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Path, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(path, content)| (path.as_path(), content.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Collects every project file below `root`.
///
/// `extensions` is an allow-list of suffixes after the final `.`; an empty
/// list accepts every file. Any entry whose name appears in `excluded` is
/// skipped together with everything beneath it.
///
/// Fails on the first unreadable directory or file; partial results are
/// never returned.
pub fn collect<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
    excluded: &[S],
) -> Result<ProjectFileSet> {
    let mut files = ProjectFileSet::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(entry, excluded));

    for entry in walker {
        let entry = entry.map_err(Error::walk)?;
        if !entry.file_type().is_file() {
            continue;
        }

        if !has_allowed_extension(entry.path(), extensions) {
            tracing::trace!(path = %entry.path().display(), "extension not allowed");
            continue;
        }

        let bytes = std::fs::read(entry.path()).map_err(|source| Error::Walk {
            path: entry.path().to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %entry.path().display(), bytes = bytes.len(), "collected");
        files.insert(FileRecord {
            path: entry.into_path(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    Ok(files)
}

/// Decides whether the walker should descend into or yield `entry`.
fn keep_entry<S: AsRef<str>>(entry: &DirEntry, excluded: &[S]) -> bool {
    // The root is always walked, even when it is "." or named like an exclusion.
    if entry.depth() == 0 {
        return true;
    }

    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        tracing::trace!(path = %entry.path().display(), "skipping hidden entry");
        return false;
    }

    if excluded.iter().any(|e| e.as_ref() == name) {
        tracing::debug!(path = %entry.path().display(), "skipping excluded entry");
        return false;
    }

    true
}

/// Returns true if the file's extension is in `extensions`, or the list is empty.
fn has_allowed_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    if extensions.is_empty() {
        return true;
    }

    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };

    // Substring after the final '.'; a name without one is its own "extension".
    let extension = name.rsplit('.').next().unwrap_or_default();
    extensions.iter().any(|e| e.as_ref() == extension)
}
