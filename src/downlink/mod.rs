//! Handoff of completed log files to the transfer service.

pub mod dispatcher;
pub mod transfer;

use thiserror::Error;

pub use dispatcher::{DispatchSummary, DownlinkDispatcher};
pub use transfer::{HttpTransfer, OutboxTransfer, Transfer};

#[derive(Debug, Error)]
pub enum DownlinkError {
    #[error("failed to list output directory '{path}': {source}")]
    ListDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("link service rejected '{file_name}' with status {status}: {message}")]
    Rejected {
        file_name: String,
        status: u16,
        message: String,
    },
}
