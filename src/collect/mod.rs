//! # File Collection
//!
//! Builds the list of [`FileEntry`] values that make up a package from the
//! toolchain and SDK install roots, following a [`Layout`]. Patched files are
//! written to a caller-owned staging directory and referenced from there.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::bytes::{NoExpand, Regex};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::common::{normalize_path, relative_destination, FileEntry};
use crate::config::{InstallRoots, Layout, PatchRule};
use crate::error::{PackagerError, Result};
use crate::setenv::{generate_set_env_cmd, SETENV_DESTINATION};

/// Compiled form of a [`PatchRule`].
struct Patcher<'a> {
    rule: &'a PatchRule,
    suffix: String,
    pattern: Regex,
}

impl<'a> Patcher<'a> {
    fn new(rule: &'a PatchRule) -> Result<Self> {
        Ok(Self {
            rule,
            suffix: format!("/{}", rule.file_name.to_lowercase()),
            pattern: Regex::new(&regex::escape(&rule.find))?,
        })
    }

    fn applies_to(&self, destination: &str) -> bool {
        let dest = destination.to_lowercase();
        dest.ends_with(&self.suffix) || dest == self.suffix[1..]
    }

    /// Copies `source` into `staging` with the replacement applied.
    fn stage(&self, source: &Path, staging: &Path) -> Result<PathBuf> {
        let original = fs::read(source).map_err(|e| PackagerError::io(e, source))?;
        let patched = self.pattern.replace_all(&original, NoExpand(self.rule.replace.as_bytes()));

        let (mut file, path) = NamedTempFile::new_in(staging)
            .and_then(|tmp| tmp.keep().map_err(|e| e.error))
            .map_err(|e| PackagerError::io(e, staging))?;
        file.write_all(&patched).map_err(|e| PackagerError::io(e, &path))?;
        debug!(from = %source.display(), to = %path.display(), "staged patched copy");
        Ok(path)
    }
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PackagerError::MissingSourceDir(path.to_path_buf()))
    }
}

/// Every regular file below `dir`, siblings in file-name order. Symlinks are
/// followed, so a linked file is packaged with its target's contents.
fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Matches `segment` against the part of `source` below its install root.
fn is_excluded(install_root: &Path, source: &Path, segment: &str) -> bool {
    let rel = source.strip_prefix(install_root).unwrap_or(source);
    normalize_path(&rel.to_string_lossy()).to_lowercase().contains(segment)
}

/// Lists the toolchain and SDK files to package.
///
/// Fails without a partial result if any directory the layout names is missing.
pub fn build_file_list(roots: &InstallRoots, layout: &Layout, staging: &Path) -> Result<Vec<FileEntry>> {
    let vs_path = roots.vs_path.as_path();
    for subdir in layout.vs_subdirs.iter().chain(layout.redist_overrides.iter().map(|o| &o.source)) {
        require_dir(&vs_path.join(subdir))?;
    }
    require_dir(&roots.sdk_path)?;

    let patcher = Patcher::new(&layout.patch)?;
    let excluded = layout.excluded_segment.to_lowercase();
    let mut result = Vec::new();

    for subdir in &layout.vs_subdirs {
        for source in walk_files(&vs_path.join(subdir))? {
            if is_excluded(vs_path, &source, &excluded) {
                continue;
            }
            let dest = relative_destination(vs_path, &source, None)?;
            if patcher.applies_to(&dest) {
                let staged = patcher.stage(&source, staging)?;
                result.push(FileEntry::new(staged, dest));
            } else {
                result.push(FileEntry::new(source, dest));
            }
        }
    }

    for redist in &layout.redist_overrides {
        for source in walk_files(&vs_path.join(&redist.source))? {
            if is_excluded(vs_path, &source, &excluded) {
                continue;
            }
            let name = source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            result.push(FileEntry::new(source, format!("{}/{}", redist.prefix, name)));
        }
    }

    for source in walk_files(&roots.sdk_path)? {
        if is_excluded(&roots.sdk_path, &source, &excluded) {
            continue;
        }
        let dest = relative_destination(&roots.sdk_path, &source, Some(&layout.sdk_prefix))?;
        result.push(FileEntry::new(source, dest));
    }

    info!(files = result.len(), "collected install files");
    Ok(result)
}

/// Generates `SetEnv.cmd` into `staging` and appends it to `files`.
pub fn add_env_setup(files: &mut Vec<FileEntry>, staging: &Path, pro: bool) -> Result<()> {
    let script = generate_set_env_cmd(staging, pro)?;
    files.push(FileEntry::new(script, SETENV_DESTINATION));
    Ok(())
}

/// Full package contents: the install files followed by the generated setup script.
pub fn collect_package_files(roots: &InstallRoots, layout: &Layout, staging: &Path, pro: bool) -> Result<Vec<FileEntry>> {
    let mut files = build_file_list(roots, layout, staging)?;
    add_env_setup(&mut files, staging, pro)?;
    Ok(files)
}
