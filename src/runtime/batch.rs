use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tokio::{
    sync::{Semaphore, broadcast, mpsc, oneshot},
    task::JoinSet,
};
use tracing::{error, info};

use crate::{
    config::Config,
    persist::{
        LogSink, PersistError,
        file::LineFileSink,
        sqlite::{ActivationId, SqliteArchive},
    },
    pipeline::{self, convert},
    qso::TimedLog,
};

use super::events::BatchEvent;

/// Why one file, or the whole run, failed.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The input could not be read.
    #[error("{}: cannot read: {source}", .path.display())]
    Read {
        /// Input path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The input is not a valid log.
    #[error("{}: {source}", .path.display())]
    Convert {
        /// Input path.
        path: PathBuf,
        /// Pipeline failure.
        #[source]
        source: pipeline::Error,
    },
    /// An artifact or the archive could not be written.
    #[error("{}: cannot write output: {source}", .path.display())]
    Persist {
        /// Artifact, archive or input path the write was for.
        path: PathBuf,
        /// Underlying write error.
        #[source]
        source: PersistError,
    },
    /// The archive worker is gone.
    #[error("archive worker stopped")]
    ChannelClosed,
    /// A conversion task panicked or was cancelled.
    #[error("join error: {0}")]
    Join(String),
}

/// Outcome of one successfully converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Input path.
    pub path: PathBuf,
    /// Contacts in the log.
    pub contacts: usize,
    /// Contacts whose time was interpolated.
    pub interpolated: usize,
    /// Artifact files written, in write order.
    pub written: Vec<PathBuf>,
    /// Archive row, when an archive is configured.
    pub archive_id: Option<ActivationId>,
}

enum ArchiveMsg {
    Append {
        log: TimedLog,
        source: String,
        resp: oneshot::Sender<Result<ActivationId, PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), PersistError>>,
    },
}

/// Converts a set of log files with bounded concurrency.
pub struct BatchRunner {
    config: Arc<Config>,
    events_tx: broadcast::Sender<BatchEvent>,
}

impl BatchRunner {
    /// Runner for `config`. Nothing is opened until [`BatchRunner::run`].
    pub fn new(config: Config) -> Self {
        let (events_tx, _) = broadcast::channel::<BatchEvent>(256);
        Self {
            config: Arc::new(config),
            events_tx,
        }
    }

    /// Per-file progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.events_tx.subscribe()
    }

    /// Converts every input independently. Results keep input order; one
    /// file failing does not stop the others.
    pub async fn run(&self, inputs: Vec<PathBuf>) -> Result<Vec<Result<FileReport, BatchError>>, BatchError> {
        let archive_tx = match &self.config.sqlite_path {
            Some(path) => {
                let archive = SqliteArchive::open(path).map_err(|source| BatchError::Persist {
                    path: path.clone(),
                    source,
                })?;
                Some(spawn_archive_worker(archive))
            }
            None => None,
        };

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut jobs = JoinSet::new();

        for (idx, path) in inputs.iter().cloned().enumerate() {
            let config = Arc::clone(&self.config);
            let events_tx = self.events_tx.clone();
            let archive_tx = archive_tx.clone();
            let permits = Arc::clone(&permits);
            jobs.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let _ = events_tx.send(BatchEvent::Started { path: path.clone() });
                let result = convert_file(&path, &config, archive_tx.as_ref()).await;
                match &result {
                    Ok(report) => {
                        info!(path = %path.display(), contacts = report.contacts, "converted");
                        let _ = events_tx.send(BatchEvent::Converted {
                            path: path.clone(),
                            contacts: report.contacts,
                            interpolated: report.interpolated,
                        });
                    }
                    Err(err) => {
                        error!(path = %path.display(), error = %err, "conversion failed");
                        let _ = events_tx.send(BatchEvent::Failed {
                            path: path.clone(),
                            error: err.to_string(),
                        });
                    }
                }
                (idx, result)
            });
        }

        let mut results: Vec<Option<Result<FileReport, BatchError>>> =
            inputs.iter().map(|_| None).collect();
        while let Some(joined) = jobs.join_next().await {
            let (idx, result) = joined.map_err(|e| BatchError::Join(e.to_string()))?;
            results[idx] = Some(result);
        }

        if let Some(tx) = archive_tx {
            shutdown_archive(&tx).await?;
        }

        Ok(results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| Err(BatchError::Join("job vanished".to_string()))))
            .collect())
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string())
}

async fn convert_file(
    path: &Path,
    config: &Arc<Config>,
    archive_tx: Option<&mpsc::Sender<ArchiveMsg>>,
) -> Result<FileReport, BatchError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let job_path = path.to_path_buf();
    let job_config = Arc::clone(config);
    let (log, written) = tokio::task::spawn_blocking(move || {
        let log = convert(&text).map_err(|source| BatchError::Convert {
            path: job_path.clone(),
            source,
        })?;
        let stem = file_stem(&job_path);
        let mut written = Vec::new();
        for artifact in job_config.artifacts() {
            let mut sink = LineFileSink::in_dir(&job_config.output_dir, &stem, artifact);
            sink.write_log(&log).map_err(|source| BatchError::Persist {
                path: sink.path().to_path_buf(),
                source,
            })?;
            written.push(sink.path().to_path_buf());
        }
        Ok::<_, BatchError>((log, written))
    })
    .await
    .map_err(|e| BatchError::Join(e.to_string()))??;

    let contacts = log.contacts.len();
    let interpolated = log.contacts.iter().filter(|c| c.interpolated).count();

    let archive_id = match archive_tx {
        Some(tx) => Some(archive(tx, log, path).await?),
        None => None,
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        contacts,
        interpolated,
        written,
        archive_id,
    })
}

async fn archive(
    tx: &mpsc::Sender<ArchiveMsg>,
    log: TimedLog,
    path: &Path,
) -> Result<ActivationId, BatchError> {
    let (resp, rx) = oneshot::channel();
    tx.send(ArchiveMsg::Append {
        log,
        source: path.display().to_string(),
        resp,
    })
    .await
    .map_err(|_| BatchError::ChannelClosed)?;
    rx.await
        .map_err(|_| BatchError::ChannelClosed)?
        .map_err(|source| BatchError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

async fn shutdown_archive(tx: &mpsc::Sender<ArchiveMsg>) -> Result<(), BatchError> {
    let (resp, rx) = oneshot::channel();
    tx.send(ArchiveMsg::Shutdown { resp })
        .await
        .map_err(|_| BatchError::ChannelClosed)?;
    rx.await
        .map_err(|_| BatchError::ChannelClosed)?
        .map_err(|source| BatchError::Persist {
            path: PathBuf::from("<archive>"),
            source,
        })
}

/// The archive connection lives on one blocking thread; appends are serialized.
fn spawn_archive_worker(mut archive: SqliteArchive) -> mpsc::Sender<ArchiveMsg> {
    let (tx, mut rx) = mpsc::channel::<ArchiveMsg>(16);
    tokio::task::spawn_blocking(move || {
        while let Some(msg) = rx.blocking_recv() {
            match msg {
                ArchiveMsg::Append { log, source, resp } => {
                    let _ = resp.send(archive.append_activation(&log, Some(&source)));
                }
                ArchiveMsg::Shutdown { resp } => {
                    let _ = resp.send(archive.flush());
                    break;
                }
            }
        }
    });
    tx
}
