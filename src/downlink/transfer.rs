use super::DownlinkError;
use crate::config::types::TransportConfig;
use crate::message::LinkRequest;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The external service that moves files off-host.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Hand the request off. Returning `Ok` means "sent", not "delivered".
    async fn send(&self, request: LinkRequest) -> Result<(), DownlinkError>;
}

/// Build the transfer collaborator selected in config.
pub fn from_config(
    transport: &TransportConfig,
    source_dir: impl Into<PathBuf>,
) -> Result<Arc<dyn Transfer>, DownlinkError> {
    Ok(match transport {
        TransportConfig::Outbox { path } => Arc::new(OutboxTransfer::new(source_dir, path.clone())),
        TransportConfig::Http { url } => Arc::new(HttpTransfer::new(url.clone())?),
    })
}

/// Moves files into `<outbox>/<subdirectory>/` on the local filesystem.
#[derive(Debug, Clone)]
pub struct OutboxTransfer {
    source_dir: PathBuf,
    outbox_dir: PathBuf,
}

impl OutboxTransfer {
    pub fn new(source_dir: impl Into<PathBuf>, outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            outbox_dir: outbox_dir.into(),
        }
    }
}

#[async_trait]
impl Transfer for OutboxTransfer {
    async fn send(&self, request: LinkRequest) -> Result<(), DownlinkError> {
        let source = self.source_dir.join(&request.file_name);
        let target_dir = self.outbox_dir.join(&request.subdirectory);
        let target = target_dir.join(&request.file_name);

        tokio::fs::create_dir_all(&target_dir).await?;

        if request.leave_source_file {
            tokio::fs::copy(&source, &target).await?;
        } else if tokio::fs::rename(&source, &target).await.is_err() {
            // Cross-device moves cannot be renamed
            tokio::fs::copy(&source, &target).await?;
            tokio::fs::remove_file(&source).await?;
        }

        debug!(
            source = %source.display(),
            target = %target.display(),
            tracking_id = %request.request_header.tracking_id,
            "Moved file to outbox"
        );
        Ok(())
    }
}

/// Posts link requests as JSON to a link service.
#[derive(Debug)]
pub struct HttpTransfer {
    url: String,
    client: reqwest::Client,
}

impl HttpTransfer {
    pub fn new(url: String) -> Result<Self, DownlinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn send(&self, request: LinkRequest) -> Result<(), DownlinkError> {
        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(DownlinkError::Rejected {
                file_name: request.file_name,
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
