use super::{is_default, RequestHeader};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category reserved for records mirrored from the sidecar's own logger.
/// Responses to these are never sent back.
pub const INTERNAL_LOG_CATEGORY: &str = "LogwellInternal";

/// Format of `LogRecord::log_time_user_readable`
pub const USER_READABLE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Telemetry,
    None,
}

/// A structured log record accepted from a producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRecord {
    #[serde(skip_serializing_if = "is_default")]
    pub request_header: RequestHeader,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sub_category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "is_default")]
    pub log_level: LogLevel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub string_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub datetime_values: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_received_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log_time_user_readable: String,
}

impl LogRecord {
    pub fn tracking_id(&self) -> &str {
        &self.request_header.tracking_id
    }

    pub fn correlation_id(&self) -> &str {
        &self.request_header.correlation_id
    }

    /// Stamp receipt time in both machine and human readable form.
    pub fn stamp_received(&mut self, at: DateTime<Utc>) {
        self.log_received_time = Some(at);
        self.log_time_user_readable = at.format(USER_READABLE_FORMAT).to_string();
    }

    pub fn is_internal(&self) -> bool {
        self.category.eq_ignore_ascii_case(INTERNAL_LOG_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serialization_omits_empty_fields() {
        let record = LogRecord {
            category: "App".to_string(),
            message: "hello".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"category":"App","message":"hello"}"#);
    }

    #[test]
    fn test_stamp_received() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let mut record = LogRecord::default();
        record.stamp_received(at);

        assert_eq!(record.log_received_time, Some(at));
        assert_eq!(record.log_time_user_readable, "2024-03-05T07:08:09.000Z");
    }

    #[test]
    fn test_internal_category_is_case_insensitive() {
        let record = LogRecord {
            category: "logwellinternal".to_string(),
            ..Default::default()
        };
        assert!(record.is_internal());
    }
}
