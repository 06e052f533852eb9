use super::queue::QueueReceiver;
use super::rotation::RotationManager;
use crate::downlink::DownlinkDispatcher;
use crate::message::LogRecord;
use crate::plugin::{PluginChain, PostWriteToLog, PreWriteToLog};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors while persisting a single record
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to append to '{path}': {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What one drain cycle did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub downlinked: usize,
}

/// The single consumer of the ingestion queue and the only code that touches
/// files in the output directory.
pub struct LogWriter {
    queue: QueueReceiver,
    rotation: RotationManager,
    plugins: PluginChain,
    dispatcher: DownlinkDispatcher,
    heartbeat: Duration,
}

impl LogWriter {
    pub fn new(
        queue: QueueReceiver,
        rotation: RotationManager,
        plugins: PluginChain,
        dispatcher: DownlinkDispatcher,
        heartbeat: Duration,
    ) -> Self {
        Self {
            queue,
            rotation,
            plugins,
            dispatcher,
            heartbeat,
        }
    }

    /// Run drain cycles until `cancel` fires, sleeping one heartbeat between
    /// cycles. Records still queued at shutdown are written (without a
    /// downlink pass) before returning.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(heartbeat_ms = self.heartbeat.as_millis() as u64, "Log writer started");

        while !cancel.is_cancelled() {
            let stats = self.run_cycle(Utc::now()).await;
            if stats != CycleStats::default() {
                debug!(
                    written = stats.written,
                    skipped = stats.skipped,
                    failed = stats.failed,
                    downlinked = stats.downlinked,
                    "Drain cycle complete"
                );
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.heartbeat) => {}
            }
        }

        let file = self.rotation.current_file(Utc::now()).await;
        let stats = self.drain(&file).await;
        info!(written = stats.written, "Log writer shutdown complete");
    }

    /// One cycle: pick the file, drain the queue into it, ship rotated files.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleStats {
        let file = self.rotation.current_file(now).await;
        let mut stats = self.drain(&file).await;

        // Re-evaluated so a file that filled up during the drain ships now
        let current = self.rotation.current_file(now).await;
        match self.dispatcher.dispatch(&current, now).await {
            Ok(summary) => stats.downlinked = summary.sent,
            Err(e) => error!(error = %e, "Failed to downlink log files"),
        }

        stats
    }

    async fn drain(&mut self, file: &Path) -> CycleStats {
        let mut stats = CycleStats::default();
        let file_name = file.display().to_string();

        while let Some(record) = self.queue.try_dequeue() {
            let tracking_id = record.tracking_id().to_string();
            let correlation_id = record.correlation_id().to_string();

            let (request, _) = self
                .plugins
                .run::<PreWriteToLog>(Some(record), Some(file_name.clone()))
                .await;

            let record = match request {
                Some(r) if r != LogRecord::default() => r,
                _ => {
                    debug!(
                        tracking_id = %tracking_id,
                        correlation_id = %correlation_id,
                        "Plugins nullified log record before write, skipping"
                    );
                    stats.skipped += 1;
                    continue;
                }
            };

            if let Err(e) = append_record(file, &record).await {
                error!(
                    tracking_id = %tracking_id,
                    correlation_id = %correlation_id,
                    error = %e,
                    "Failed to write log record"
                );
                stats.failed += 1;
                continue;
            }
            stats.written += 1;

            // Informational only; the result does not change what was persisted
            let _ = self
                .plugins
                .run::<PostWriteToLog>(Some(record), Some(file_name.clone()))
                .await;
        }

        if stats.failed > 0 {
            warn!(failed = stats.failed, file = %file_name, "Some log records were dropped");
        }

        stats
    }
}

/// Append one record as a single JSON line, creating the file and its
/// directory when absent.
pub async fn append_record(file: &Path, record: &LogRecord) -> Result<(), WriteError> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let append_err = |source: std::io::Error| WriteError::Append {
        path: file.to_path_buf(),
        source,
    };

    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(append_err)?;
    }

    let mut handle = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .await
        .map_err(append_err)?;
    handle.write_all(line.as_bytes()).await.map_err(append_err)?;
    handle.flush().await.map_err(append_err)?;

    Ok(())
}
