use super::RequestHeader;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[default]
    Downlink,
    Uplink,
    Crosslink,
}

/// Request handed to the transfer service to move one file off-host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub request_header: RequestHeader,
    pub destination_app_id: String,
    pub file_name: String,
    pub subdirectory: String,
    pub expiration_time: DateTime<Utc>,
    /// `false` instructs the transfer layer to delete the source once sent
    pub leave_source_file: bool,
    pub link_type: LinkType,
    pub priority: Priority,
}
