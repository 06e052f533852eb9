use super::{is_default, RequestHeader};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    #[default]
    Unknown,
    Successful,
    Ready,
    Pending,
    Rejected,
    Timeout,
    NotFound,
    InvalidArgument,
    GeneralFailure,
}

/// Response sent back to the producer of an accepted request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tracking_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub correlation_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    /// Echo the correlation identifiers of `header` with the given status.
    pub fn for_request(header: &RequestHeader, status: StatusCode) -> Self {
        Self {
            tracking_id: header.tracking_id.clone(),
            correlation_id: header.correlation_id.clone(),
            status,
            message: None,
        }
    }
}
