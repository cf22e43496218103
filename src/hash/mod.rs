//! # Tree Fingerprints
//!
//! Computes the SHA-1 that names a package. The digest covers the sorted,
//! lower-cased path of every visible file under a root together with the
//! file's bytes, so it can be reproduced from any extracted copy of the tree.
//!
//! Hashing a full toolchain means reading gigabytes, so the file list and each
//! file's modification time are remembered in a `.timestamps` file one level
//! above the root. When the list and every mtime still match, the remembered
//! digest is returned without opening a single file. A file rewritten in place
//! with an identical mtime goes unnoticed; that staleness is accepted.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{PackagerError, Result};
use crate::fsx::FileVisibilityChecker;

/// Name of the cache file written next to the hashed root.
pub const TIMESTAMPS_FILE_NAME: &str = ".timestamps";

/// Separator used inside hash keys. Matches the consuming platform so that a
/// digest computed here equals the one computed where the package is unpacked.
pub const KEY_SEPARATOR: char = '\\';

/// A file taking part in a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// Path relative to the base directory, root included, ASCII letters lower-cased.
    pub key: String,
    /// Where the file actually lives.
    pub disk_path: PathBuf,
}

/// `[path, mtime]` as stored in the cache file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimestampRecord(pub String, pub f64);

/// Snapshot of a previously hashed tree.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TimestampCache {
    pub files: Vec<TimestampRecord>,
    pub sha1: String,
}

impl TimestampCache {
    /// Reads the cache at `path`. A missing or malformed file yields an empty
    /// cache, which forces a full recomputation.
    pub fn load(path: &Path) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no timestamp cache");
                return Self::default();
            }
        };
        match serde_json::from_slice::<TimestampCache>(&bytes) {
            Ok(cache) => cache,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring malformed timestamp cache");
                Self::default()
            }
        }
    }

    /// Writes the cache to `path`, replacing whatever was there.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(self)?;
        fs::write(path, bytes).map_err(|e| PackagerError::io(e, path))
    }

    /// True when `files` is exactly the cached list and no mtime moved.
    /// Stops at the first difference.
    pub fn matches(&self, files: &[HashedFile]) -> bool {
        if self.sha1.is_empty() || self.files.len() != files.len() {
            return false;
        }
        files.iter().zip(&self.files).all(|(disk, TimestampRecord(path, mtime))| {
            disk.key == *path
                && matches!(file_mtime(&disk.disk_path), Ok(current) if current == *mtime)
        })
    }
}

/// Result of fingerprinting a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDigest {
    /// Lower-case hex SHA-1.
    pub sha1: String,
    /// Whether the digest was taken from the timestamp cache.
    pub from_cache: bool,
}

/// Modification time in seconds since the Unix epoch, with sub-second precision.
pub fn file_mtime(path: &Path) -> io::Result<f64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    })
}

/// Rejects roots that are absolute or not in normalized form.
pub fn validate_root(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() || root.is_absolute() || root.has_root() {
        return Err(PackagerError::InvalidRoot(root.to_path_buf()));
    }
    let mut rebuilt = PathBuf::new();
    for component in root.components() {
        match component {
            Component::Normal(part) => rebuilt.push(part),
            _ => return Err(PackagerError::InvalidRoot(root.to_path_buf())),
        }
    }
    if rebuilt.as_os_str() != root.as_os_str() {
        return Err(PackagerError::InvalidRoot(root.to_path_buf()));
    }
    Ok(())
}

/// Location of the cache file for `root`: one directory above it.
pub fn timestamps_path(base: &Path, root: &Path) -> PathBuf {
    let full = base.join(root);
    full.parent().unwrap_or(base).join(TIMESTAMPS_FILE_NAME)
}

/// Lists every visible regular file under `base/root`, keyed and sorted.
pub fn get_file_list(base: &Path, root: &Path, checker: &dyn FileVisibilityChecker) -> Result<Vec<HashedFile>> {
    validate_root(root)?;
    let mut files = Vec::new();
    for entry in WalkDir::new(base.join(root)) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if checker.is_hidden(path).map_err(|e| PackagerError::io(e, path))? {
            debug!(path = %path.display(), "skipping hidden file");
            continue;
        }
        let rel = path.strip_prefix(base).map_err(|_| PackagerError::StripPrefix {
            prefix: base.to_path_buf(),
            path: path.to_path_buf(),
        })?;
        files.push(HashedFile { key: hash_key(rel), disk_path: path.to_path_buf() });
    }
    files.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(files)
}

fn hash_key(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join(&KEY_SEPARATOR.to_string()).to_ascii_lowercase()
}

/// SHA-1 over each key followed by the file's bytes, in list order.
pub fn digest_files(files: &[HashedFile]) -> Result<String> {
    let mut digest = Sha1::new();
    for file in files {
        digest.update(file.key.as_bytes());
        let mut f = File::open(&file.disk_path).map_err(|e| PackagerError::io(e, &file.disk_path))?;
        io::copy(&mut f, &mut digest).map_err(|e| PackagerError::io(e, &file.disk_path))?;
    }
    Ok(format!("{:x}", digest.finalize()))
}

/// Fingerprints the tree at `base/root`, reusing the timestamp cache when it
/// still describes the tree and refreshing it otherwise.
///
/// `root` must be relative and normalized; it is part of every hash key.
pub fn calculate_hash(base: &Path, root: &Path, checker: &dyn FileVisibilityChecker) -> Result<TreeDigest> {
    let files = get_file_list(base, root, checker)?;

    let cache_path = timestamps_path(base, root);
    let cache = TimestampCache::load(&cache_path);
    if cache.matches(&files) {
        info!(files = files.len(), "timestamps unchanged, reusing cached digest");
        return Ok(TreeDigest { sha1: cache.sha1, from_cache: true });
    }

    // mtimes are sampled before reading so a file touched mid-hash invalidates the next run
    let mut records = Vec::with_capacity(files.len());
    for file in &files {
        let mtime = file_mtime(&file.disk_path).map_err(|e| PackagerError::io(e, &file.disk_path))?;
        records.push(TimestampRecord(file.key.clone(), mtime));
    }

    info!(files = files.len(), "hashing file contents");
    let sha1 = digest_files(&files)?;

    let fresh = TimestampCache { files: records, sha1: sha1.clone() };
    if let Err(e) = fresh.save(&cache_path) {
        warn!(error = %e, "could not write timestamp cache");
    }

    Ok(TreeDigest { sha1, from_cache: false })
}
