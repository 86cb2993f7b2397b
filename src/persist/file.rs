//! Writes one rendered artifact per log to a file.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::qso::TimedLog;

use super::{LogSink, PersistResult, render};

/// Which rendering a [`LineFileSink`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Human-readable activation log.
    ActivationLog,
    /// SOTA `V2` summary.
    Summary,
    /// Pretty-printed JSON of the timed log.
    Json,
}

impl Artifact {
    /// File extension used for this artifact.
    pub fn extension(self) -> &'static str {
        match self {
            Artifact::ActivationLog => "txt",
            Artifact::Summary => "csv",
            Artifact::Json => "json",
        }
    }
}

/// File sink for one artifact. The file is created (or truncated) on each write.
#[derive(Debug, Clone)]
pub struct LineFileSink {
    path: PathBuf,
    artifact: Artifact,
}

impl LineFileSink {
    /// Sink writing `artifact` to `path`.
    pub fn new(path: impl Into<PathBuf>, artifact: Artifact) -> Self {
        Self {
            path: path.into(),
            artifact,
        }
    }

    /// Sink writing `<dir>/<stem>.<ext>`.
    pub fn in_dir(dir: &Path, stem: &str, artifact: Artifact) -> Self {
        Self::new(dir.join(format!("{stem}.{}", artifact.extension())), artifact)
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for LineFileSink {
    fn write_log(&mut self, log: &TimedLog) -> PersistResult<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        match self.artifact {
            Artifact::ActivationLog => {
                for line in render::activation_log_lines(log) {
                    writeln!(out, "{line}")?;
                }
            }
            Artifact::Summary => {
                for line in render::summary_lines(log) {
                    writeln!(out, "{line}")?;
                }
            }
            Artifact::Json => {
                serde_json::to_writer_pretty(&mut out, log)?;
                writeln!(out)?;
            }
        }
        out.flush()?;
        info!(path = %self.path.display(), artifact = ?self.artifact, "wrote");
        Ok(())
    }
}
