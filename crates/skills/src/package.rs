//! In-memory package contents and the on-disk loader.
//!
//! A package is a flat map of `/`-separated relative paths to UTF-8 text,
//! regardless of whether it came from a folder, an archive or the network.

use contextforge_core::PackageError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File name of the optional step graph inside a package.
pub const CONTEXT_MAP_FILE: &str = "context-map.yaml";

/// Relative path → content, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFiles {
    files: BTreeMap<String, String>,
}

impl PackageFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every file under `root` into memory.
    ///
    /// Symlinks are not followed. Files that are not valid UTF-8 are skipped.
    pub fn load_dir(root: &Path) -> Result<Self, PackageError> {
        let mut package = Self::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let bytes = std::fs::read(entry.path()).map_err(|e| io_error(entry.path(), e))?;
            match String::from_utf8(bytes) {
                Ok(content) => {
                    package.files.insert(key, content);
                }
                Err(_) => warn!(path = %key, "Skipping non-UTF-8 package file"),
            }
        }

        debug!(root = %root.display(), files = package.len(), "Loaded package directory");
        Ok(package)
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Every path in the package.
    pub fn paths(&self) -> BTreeSet<String> {
        self.files.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Content of the package's `context-map.yaml`, if any.
    pub fn context_map(&self) -> Option<&str> {
        self.get(CONTEXT_MAP_FILE)
    }

    /// Write every file under `root`, creating directories as needed.
    pub fn write_to(&self, root: &Path) -> Result<(), PackageError> {
        for (relative, content) in &self.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
            std::fs::write(&path, content).map_err(|e| io_error(&path, e))?;
        }
        Ok(())
    }
}

impl From<BTreeMap<String, String>> for PackageFiles {
    fn from(files: BTreeMap<String, String>) -> Self {
        Self { files }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PackageFiles {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> PackageError {
    PackageError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> PackageError {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.into_io_error() {
        Some(io) => io_error(&path, io),
        None => PackageError::Io {
            path: path.display().to_string(),
            reason: "filesystem loop detected".into(),
        },
    }
}
