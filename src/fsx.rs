//! Cross-platform file attribute queries.
//!
//! The consuming end of a package runs on Windows, where files carrying the
//! hidden or system attribute are skipped when a tree is rebuilt. The hasher
//! asks a [`FileVisibilityChecker`] which files to leave out so both ends
//! agree. On other hosts there is no such attribute and every file counts as
//! visible.

use std::io;
use std::path::Path;

/// Decides whether a file takes part in a tree fingerprint.
pub trait FileVisibilityChecker {
    /// Returns `true` if `path` has the hidden or system attribute set.
    fn is_hidden(&self, path: &Path) -> io::Result<bool>;
}

#[cfg(target_os = "windows")]
const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
#[cfg(target_os = "windows")]
const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

/// Reads the Win32 attribute bits of each file.
#[cfg(target_os = "windows")]
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeChecker;

#[cfg(target_os = "windows")]
impl FileVisibilityChecker for AttributeChecker {
    fn is_hidden(&self, path: &Path) -> io::Result<bool> {
        use std::os::windows::fs::MetadataExt;
        let attrs = std::fs::metadata(path)?.file_attributes();
        Ok(attrs & (FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) != 0)
    }
}

/// Treats every file as visible. Used where the attribute query is unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysVisible;

impl FileVisibilityChecker for AlwaysVisible {
    fn is_hidden(&self, _path: &Path) -> io::Result<bool> {
        Ok(false)
    }
}

/// Picks the checker for the platform this process runs on.
#[cfg(target_os = "windows")]
pub fn platform_checker() -> Box<dyn FileVisibilityChecker> {
    Box::new(AttributeChecker)
}

/// Picks the checker for the platform this process runs on.
#[cfg(not(target_os = "windows"))]
pub fn platform_checker() -> Box<dyn FileVisibilityChecker> {
    Box::new(AlwaysVisible)
}
