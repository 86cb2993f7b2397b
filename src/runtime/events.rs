//! Runtime event stream payloads.

use std::path::PathBuf;

/// Progress of one input file through a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// The file was picked up.
    Started {
        /// Input path.
        path: PathBuf,
    },
    /// The file was converted and its artifacts written.
    Converted {
        /// Input path.
        path: PathBuf,
        /// Number of contacts in the log.
        contacts: usize,
        /// How many of them had their time interpolated.
        interpolated: usize,
    },
    /// The file failed; other files are unaffected.
    Failed {
        /// Input path.
        path: PathBuf,
        /// Rendered error.
        error: String,
    },
}
