use super::{DownlinkError, Transfer};
use crate::config::types::DownlinkConfig;
use crate::message::{LinkRequest, LinkType, Priority, RequestHeader};
use chrono::{DateTime, Utc};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Ships every non-active file in the output directory.
///
/// "Sent" is the completion condition: deletion of the source is left to the
/// transfer layer, so a failed handoff is simply retried on the next pass.
pub struct DownlinkDispatcher {
    output_dir: PathBuf,
    destination_app_id: String,
    subdirectory: String,
    expiration_horizon: Duration,
    transfer: Arc<dyn Transfer>,
}

impl DownlinkDispatcher {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        config: &DownlinkConfig,
        transfer: Arc<dyn Transfer>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            destination_app_id: config.destination_app_id.clone(),
            subdirectory: config.subdirectory.clone(),
            expiration_horizon: config.expiration_horizon,
            transfer,
        }
    }

    pub fn link_request(&self, file_name: &str, now: DateTime<Utc>) -> LinkRequest {
        let horizon = chrono::Duration::from_std(self.expiration_horizon)
            .unwrap_or_else(|_| chrono::Duration::hours(12));

        LinkRequest {
            request_header: RequestHeader::fresh(),
            destination_app_id: self.destination_app_id.clone(),
            file_name: file_name.to_string(),
            subdirectory: self.subdirectory.clone(),
            expiration_time: now + horizon,
            leave_source_file: false,
            link_type: LinkType::Downlink,
            priority: Priority::Medium,
        }
    }

    /// Hand off every file except `current_file`. Only a failure to list the
    /// directory is returned; individual handoff failures are counted.
    pub async fn dispatch(
        &self,
        current_file: &Path,
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, DownlinkError> {
        let mut summary = DispatchSummary::default();
        let current_name = current_file.file_name();

        debug!(current_file = %current_file.display(), "Starting downlink pass");

        for file_name in self.list_files().await? {
            if Some(OsStr::new(&file_name)) == current_name {
                continue;
            }

            let request = self.link_request(&file_name, now);
            info!(
                file = %file_name,
                tracking_id = %request.request_header.tracking_id,
                "Downlinking log file"
            );

            match self.transfer.send(request).await {
                Ok(()) => {
                    debug!(file = %file_name, "Downlink handoff complete");
                    summary.sent += 1;
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Failed to downlink log file, will retry");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn list_files(&self) -> Result<Vec<String>, DownlinkError> {
        let list_err = |source: std::io::Error| DownlinkError::ListDir {
            path: self.output_dir.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.output_dir).await.map_err(list_err)?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::TransportConfig;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records requests; fails for file names containing "bad".
    #[derive(Default)]
    struct RecordingTransfer {
        requests: Mutex<Vec<LinkRequest>>,
    }

    #[async_trait]
    impl Transfer for RecordingTransfer {
        async fn send(&self, request: LinkRequest) -> Result<(), DownlinkError> {
            if request.file_name.contains("bad") {
                return Err(DownlinkError::Rejected {
                    file_name: request.file_name,
                    status: 500,
                    message: "unavailable".to_string(),
                });
            }
            self.requests.lock().unwrap().push(request);
            Ok(())
        }
    }

    fn config() -> DownlinkConfig {
        DownlinkConfig {
            destination_app_id: "platform-mts".to_string(),
            subdirectory: "logs".to_string(),
            expiration_horizon: Duration::from_secs(12 * 3600),
            transport: TransportConfig::Http {
                url: "http://localhost".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_dispatch_skips_current_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("current.json"), "a").unwrap();
        fs::write(dir.path().join("old.json"), "b").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let transfer = Arc::new(RecordingTransfer::default());
        let dispatcher = DownlinkDispatcher::new(dir.path(), &config(), transfer.clone());
        let now = Utc::now();

        let summary = dispatcher
            .dispatch(&dir.path().join("current.json"), now)
            .await
            .unwrap();

        assert_eq!(summary, DispatchSummary { sent: 1, failed: 0 });
        let requests = transfer.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.file_name, "old.json");
        assert_eq!(request.destination_app_id, "platform-mts");
        assert_eq!(request.subdirectory, "logs");
        assert_eq!(request.expiration_time, now + chrono::Duration::hours(12));
        assert!(!request.leave_source_file);
        assert_eq!(request.priority, Priority::Medium);
        assert_eq!(request.link_type, LinkType::Downlink);
        assert!(!request.request_header.tracking_id.is_empty());
        assert_ne!(
            request.request_header.tracking_id,
            request.request_header.correlation_id
        );
    }

    #[tokio::test]
    async fn test_failed_handoff_does_not_block_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.json"), "a").unwrap();
        fs::write(dir.path().join("good-1.json"), "b").unwrap();
        fs::write(dir.path().join("good-2.json"), "c").unwrap();

        let transfer = Arc::new(RecordingTransfer::default());
        let dispatcher = DownlinkDispatcher::new(dir.path(), &config(), transfer.clone());

        let summary = dispatcher
            .dispatch(&dir.path().join("current.json"), Utc::now())
            .await
            .unwrap();

        assert_eq!(summary, DispatchSummary { sent: 2, failed: 1 });
    }

    #[tokio::test]
    async fn test_missing_output_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let dispatcher =
            DownlinkDispatcher::new(&missing, &config(), Arc::new(RecordingTransfer::default()));

        let result = dispatcher.dispatch(&missing.join("current.json"), Utc::now()).await;
        assert!(matches!(result, Err(DownlinkError::ListDir { .. })));
    }
}
