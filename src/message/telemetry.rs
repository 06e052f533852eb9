use super::{is_default, RequestHeader};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryRecord {
    #[serde(skip_serializing_if = "is_default")]
    pub request_header: RequestHeader,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub metric_name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub metric_value: f64,
    /// Backfilled with ingestion time when the producer leaves it out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_time: Option<DateTime<Utc>>,
}

/// Several metrics delivered in one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryBatch {
    #[serde(skip_serializing_if = "is_default")]
    pub request_header: RequestHeader,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<TelemetryRecord>,
}
