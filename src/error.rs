use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all operations in the `toolchain-pack` crate.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// An I/O error occurred, typically while reading or writing a file.
    /// Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", path.display())]
    Io { source: std::io::Error, path: PathBuf },

    /// An error occurred when trying to strip a prefix from a file path.
    #[error("Could not strip prefix '{}' from path '{}'", prefix.display(), path.display())]
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// A source directory the fixed install layout relies on is absent or not a directory.
    #[error("Expected directory '{}' does not exist or is not a directory", .0.display())]
    MissingSourceDir(PathBuf),

    /// The hash root was absolute or not in normalized form.
    #[error("Hash root '{}' must be a relative, normalized path", .0.display())]
    InvalidRoot(PathBuf),

    /// Two entries map to the same location inside the package.
    #[error("Duplicate destination '{destination}' (from '{}')", source_path.display())]
    DuplicateDestination { destination: String, source_path: PathBuf },

    /// The temporary archive vanished before it could be renamed to its digest.
    #[error("Cannot rename '{}': file does not exist", .0.display())]
    RenameTargetMissing(PathBuf),

    /// A packager was asked to run again after finishing or failing.
    #[error("Packaging run already finished (stage {0})")]
    RunFinished(String),

    /// An error during serialization or deserialization of the timestamp cache or layout file.
    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// The patch rule's search text could not be compiled.
    #[error("Invalid patch pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An error from the `zip` crate while writing or extracting the package.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An error while walking a directory tree.
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl PackagerError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        PackagerError::Io { source, path: path.into() }
    }
}

// Generic IO error conversion that doesn't require a path
impl From<std::io::Error> for PackagerError {
    fn from(err: std::io::Error) -> Self {
        PackagerError::Io { source: err, path: PathBuf::new() }
    }
}

pub type Result<T, E = PackagerError> = std::result::Result<T, E>;
