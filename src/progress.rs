//! Progress tracking for package writing.
//!
//! The archive writer reports one [`ProgressState`] per file through an
//! optional callback; the CLI turns these into a single updating status line.
//! Reporting is purely observational.

/// Snapshot of how far the writer has got.
#[derive(Debug, Clone)]
pub struct ProgressState {
    pub total_files: u64,
    /// Files finished before `current`.
    pub processed_files: u64,
    /// Source path of the file being written.
    pub current: String,
}

impl ProgressState {
    pub fn is_complete(&self) -> bool {
        self.processed_files >= self.total_files
    }
}

/// Progress callback function type
pub type ProgressCallback<'a> = dyn Fn(ProgressState) + 'a;

/// Counts written files and forwards snapshots to the callback, if any.
pub struct ProgressTracker<'a> {
    total_files: u64,
    processed_files: u64,
    callback: Option<&'a ProgressCallback<'a>>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(total_files: u64, callback: Option<&'a ProgressCallback<'a>>) -> Self {
        Self {
            total_files,
            processed_files: 0,
            callback,
        }
    }

    /// Announces that `current` is about to be written.
    pub fn start_file(&self, current: &str) {
        self.emit(current);
    }

    /// Records that the file announced last is done.
    pub fn finish_file(&mut self) {
        self.processed_files += 1;
    }

    /// Emits the final, complete state.
    pub fn finish(&self) {
        self.emit("");
    }

    pub fn processed_files(&self) -> u64 {
        self.processed_files
    }

    fn emit(&self, current: &str) {
        if let Some(cb) = self.callback {
            cb(ProgressState {
                total_files: self.total_files,
                processed_files: self.processed_files,
                current: current.to_string(),
            });
        }
    }
}

/// The last `max_chars` characters of `s`.
pub fn tail_chars(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    let skip = count - max_chars;
    let start = s.char_indices().nth(skip).map(|(i, _)| i).unwrap_or(s.len());
    &s[start..]
}
