//! Output and concurrency settings for a conversion run.

use std::path::PathBuf;

use crate::persist::file::Artifact;

/// What a batch run writes and how many files it converts at once.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving `<stem>.txt`, `<stem>.csv` and `<stem>.json`.
    pub output_dir: PathBuf,
    /// Write the human-readable activation log.
    pub write_text: bool,
    /// Write the SOTA summary CSV.
    pub write_summary: bool,
    /// Write the JSON dump of the timed log.
    pub write_json: bool,
    /// Append every converted log to this SQLite archive.
    pub sqlite_path: Option<PathBuf>,
    /// Upper bound on files converted concurrently.
    pub max_concurrent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            write_text: true,
            write_summary: true,
            write_json: false,
            sqlite_path: None,
            max_concurrent: 4,
        }
    }
}

impl Config {
    /// File artifacts enabled by this config, in write order.
    pub fn artifacts(&self) -> Vec<Artifact> {
        [
            (self.write_summary, Artifact::Summary),
            (self.write_text, Artifact::ActivationLog),
            (self.write_json, Artifact::Json),
        ]
        .into_iter()
        .filter_map(|(on, artifact)| on.then_some(artifact))
        .collect()
    }
}
