//! # Extraction Module
//!
//! Unpacks a package so its contents can be fingerprinted exactly as the
//! consuming end will see them.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::error::{PackagerError, Result};

/// Extracts every entry of `archive_path` beneath `output_dir`, creating it if needed.
///
/// Returns the number of entries in the archive.
pub fn extract_package(archive_path: &Path, output_dir: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| PackagerError::io(e, archive_path))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    archive.extract(output_dir)?;
    debug!(entries = archive.len(), to = %output_dir.display(), "package extracted");
    Ok(archive.len())
}

/// Names of all entries in `archive_path`, in archive order.
pub fn list_entries(archive_path: &Path) -> Result<Vec<String>> {
    let file = File::open(archive_path).map_err(|e| PackagerError::io(e, archive_path))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::write_package;
    use crate::common::FileEntry;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_extract_recreates_tree() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let src = dir.path().join("cl.exe");
        fs::write(&src, b"MZ")?;
        let archive = dir.path().join("pkg.zip");
        write_package(&[FileEntry::new(&src, "VC/bin/cl.exe")], &archive, None)?;

        let out = dir.path().join("unpacked").join("vs2013_files");
        assert_eq!(extract_package(&archive, &out)?, 1);
        assert_eq!(fs::read(out.join("VC").join("bin").join("cl.exe"))?, b"MZ");
        Ok(())
    }

    #[test]
    fn test_list_entries_preserves_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let src = dir.path().join("f");
        fs::write(&src, b"x")?;
        let archive = dir.path().join("pkg.zip");
        let files = vec![FileEntry::new(&src, "b"), FileEntry::new(&src, "a/c")];
        write_package(&files, &archive, None)?;

        assert_eq!(list_entries(&archive)?, vec!["b".to_string(), "a/c".to_string()]);
        Ok(())
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.zip");
        fs::write(&bogus, b"not a zip").unwrap();
        assert!(matches!(extract_package(&bogus, dir.path()), Err(PackagerError::Zip(_))));
    }
}
