//! Common utilities and types module.
// Shared structs and path helpers.

use std::path::{Path, PathBuf};

/// One file to place in the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path of the file on disk (possibly a staged, patched copy).
    pub source: PathBuf,
    /// Slash-separated location inside the package.
    pub destination: String,
}

impl FileEntry {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<String>) -> Self {
        Self { source: source.into(), destination: destination.into() }
    }
}

/// Normalize path by replacing backslashes with forward slashes and maintaining directory structure.
/// Remove unnecessary path components like './' while preserving all directories.
/// Example: "./dir1\\dir2//file.txt" becomes "dir1/dir2/file.txt"
pub fn normalize_path(path: &str) -> String {
    let s = path.replace('\\', "/");
    let trimmed = s.strip_prefix("./").unwrap_or(&s);

    let mut res = trimmed.to_string();
    while res.contains("//") {
        res = res.replace("//", "/");
    }
    res
}

/// Builds the package destination of `path`, relative to `base`, optionally under `prefix`.
pub fn relative_destination(base: &Path, path: &Path, prefix: Option<&str>) -> Result<String, crate::PackagerError> {
    let rel = path.strip_prefix(base).map_err(|_| crate::PackagerError::StripPrefix {
        prefix: base.to_path_buf(),
        path: path.to_path_buf(),
    })?;
    let rel = normalize_path(&rel.to_string_lossy());
    Ok(match prefix {
        Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), rel),
        None => rel,
    })
}
