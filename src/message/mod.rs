//! Message types exchanged with producers, plugins and the link service.
//!
//! Every struct serializes with default/empty fields omitted so that a
//! persisted log line only carries what the producer actually set.

pub mod envelope;
pub mod link;
pub mod log;
pub mod telemetry;

use serde::{Deserialize, Serialize};

pub use envelope::{ResponseEnvelope, StatusCode};
pub use link::{LinkRequest, LinkType, Priority};
pub use log::{LogLevel, LogRecord, INTERNAL_LOG_CATEGORY};
pub use telemetry::{TelemetryBatch, TelemetryRecord};

/// Correlation identifiers carried by every inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestHeader {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tracking_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub correlation_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_id: String,
}

impl RequestHeader {
    /// A header with freshly generated tracking and correlation ids.
    pub fn fresh() -> Self {
        Self {
            tracking_id: uuid::Uuid::new_v4().to_string(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
            app_id: String::new(),
        }
    }
}

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
