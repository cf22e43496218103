//! Drives a packaging run from install tree to `<sha1>.zip`.
//!
//! A run moves through [`Stage`]s strictly in order and never revisits one;
//! any error aborts it. Nothing survives an aborted run except the timestamp
//! cache, which only ever speeds things up.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::archive::{write_listing, write_package, TEMP_ARCHIVE_NAME};
use crate::collect::collect_package_files;
use crate::config::{InstallRoots, Layout};
use crate::error::{PackagerError, Result};
use crate::extract::extract_package;
use crate::fsx::FileVisibilityChecker;
use crate::hash::{calculate_hash, TreeDigest};
use crate::progress::ProgressCallback;

/// Folder the package is extracted into before hashing. Part of every hash
/// key, so it must match what the unpacking side uses.
pub const EXTRACT_DIR_NAME: &str = "vs2013_files";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collecting,
    Writing,
    Extracting,
    Hashing,
    Renaming,
    Done,
}

#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub roots: InstallRoots,
    pub layout: Layout,
    /// Directory receiving `out.zip` and, later, `<sha1>.zip`.
    pub output_dir: PathBuf,
    /// Generate `SetEnv.cmd` for the Professional edition's tool layout.
    pub pro: bool,
    /// List the file mapping and stop before writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// Dry run: the mapping was listed.
    Listed { entries: usize },
    Packaged { path: PathBuf, sha1: String },
}

pub struct Packager<'a> {
    options: PackageOptions,
    checker: &'a dyn FileVisibilityChecker,
    progress: Option<&'a ProgressCallback<'a>>,
    stage: Stage,
    visited: Vec<Stage>,
    started: bool,
}

impl<'a> Packager<'a> {
    pub fn new(options: PackageOptions, checker: &'a dyn FileVisibilityChecker) -> Self {
        Self {
            options,
            checker,
            progress: None,
            stage: Stage::Collecting,
            visited: vec![Stage::Collecting],
            started: false,
        }
    }

    pub fn with_progress(mut self, progress: &'a ProgressCallback<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Every stage entered so far, in order.
    pub fn visited(&self) -> &[Stage] {
        &self.visited
    }

    fn enter(&mut self, stage: Stage) {
        info!(from = ?self.stage, to = ?stage, "stage");
        self.stage = stage;
        self.visited.push(stage);
    }

    /// Runs every stage. In dry-run mode the mapping goes to `listing` and the
    /// run ends after collection.
    ///
    /// A packager runs once; any later call fails with
    /// [`PackagerError::RunFinished`].
    pub fn run(&mut self, listing: &mut dyn Write) -> Result<PackageOutcome> {
        // a failed run cannot be resumed either
        if self.started {
            return Err(PackagerError::RunFinished(format!("{:?}", self.stage)));
        }
        self.started = true;
        let staging = tempfile::tempdir()?;
        let files = collect_package_files(&self.options.roots, &self.options.layout, staging.path(), self.options.pro)?;

        if self.options.dry_run {
            write_listing(&files, listing)?;
            self.enter(Stage::Done);
            return Ok(PackageOutcome::Listed { entries: files.len() });
        }

        self.enter(Stage::Writing);
        let output = self.options.output_dir.join(TEMP_ARCHIVE_NAME);
        write_package(&files, &output, self.progress)?;
        drop(staging);

        self.enter(Stage::Extracting);
        let scratch = tempfile::tempdir()?;
        extract_package(&output, &scratch.path().join(EXTRACT_DIR_NAME))?;

        self.enter(Stage::Hashing);
        let digest = calculate_hash(scratch.path(), Path::new(EXTRACT_DIR_NAME), self.checker)?;
        scratch.close()?;

        self.enter(Stage::Renaming);
        let path = rename_to_digest(&output, &digest)?;

        self.enter(Stage::Done);
        Ok(PackageOutcome::Packaged { path, sha1: digest.sha1 })
    }
}

/// Renames `output` to `<sha1>.zip` in the same directory.
pub fn rename_to_digest(output: &Path, digest: &TreeDigest) -> Result<PathBuf> {
    if !output.is_file() {
        return Err(PackagerError::RenameTargetMissing(output.to_path_buf()));
    }
    let final_path = output.with_file_name(format!("{}.zip", digest.sha1));
    fs::rename(output, &final_path).map_err(|e| PackagerError::io(e, output))?;
    info!(from = %output.display(), to = %final_path.display(), "renamed package");
    Ok(final_path)
}

/// Extracts `archive` into a scratch directory and fingerprints the result
/// the way the unpacking side does.
pub fn hash_package(archive: &Path, checker: &dyn FileVisibilityChecker) -> Result<TreeDigest> {
    let scratch = tempfile::tempdir()?;
    extract_package(archive, &scratch.path().join(EXTRACT_DIR_NAME))?;
    calculate_hash(scratch.path(), Path::new(EXTRACT_DIR_NAME), checker)
}
