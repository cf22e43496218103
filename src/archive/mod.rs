//! # Package Writer
//!
//! Writes a list of [`FileEntry`] values into a deflate-compressed ZIP, each
//! file stored under its destination path.
//!
//! Entries carry the ZIP format's fixed default timestamp rather than the
//! source mtime, so two runs over the same inputs produce identical bytes.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::common::FileEntry;
use crate::error::{PackagerError, Result};
use crate::progress::{ProgressCallback, ProgressTracker};

/// Name the package is written under until its digest is known.
pub const TEMP_ARCHIVE_NAME: &str = "out.zip";

/// Fails on the first destination that repeats an earlier one, ignoring case.
pub fn check_unique_destinations(files: &[FileEntry]) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(files.len());
    for entry in files {
        if seen.insert(entry.destination.to_lowercase(), &entry.source).is_some() {
            return Err(PackagerError::DuplicateDestination {
                destination: entry.destination.clone(),
                source_path: entry.source.clone(),
            });
        }
    }
    Ok(())
}

/// Writes `files` into a new archive at `output`, replacing any existing file.
///
/// Returns the number of entries written.
pub fn write_package(files: &[FileEntry], output: &Path, progress: Option<&ProgressCallback<'_>>) -> Result<u64> {
    check_unique_destinations(files)?;

    if output.exists() {
        fs::remove_file(output).map_err(|e| PackagerError::io(e, output))?;
    }
    let out_file = File::create(output).map_err(|e| PackagerError::io(e, output))?;
    let mut zip = ZipWriter::new(BufWriter::new(out_file));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut tracker = ProgressTracker::new(files.len() as u64, progress);
    for entry in files {
        tracker.start_file(&entry.source.to_string_lossy());

        let mut source = File::open(&entry.source).map_err(|e| PackagerError::io(e, &entry.source))?;
        let size = source.metadata().map_err(|e| PackagerError::io(e, &entry.source))?.len();
        zip.start_file(entry.destination.as_str(), options.large_file(size >= u32::MAX as u64))?;
        io::copy(&mut source, &mut zip).map_err(|e| PackagerError::io(e, &entry.source))?;

        tracker.finish_file();
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(|e| PackagerError::io(e, output))?;
    tracker.finish();

    info!(entries = tracker.processed_files(), output = %output.display(), "package written");
    Ok(tracker.processed_files())
}

/// Prints `source -> destination` for every entry instead of archiving.
pub fn write_listing<W: Write + ?Sized>(files: &[FileEntry], out: &mut W) -> io::Result<()> {
    for entry in files {
        writeln!(out, "{} -> {}", entry.source.display(), entry.destination)?;
    }
    Ok(())
}
