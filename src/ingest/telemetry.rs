use crate::message::log::USER_READABLE_FORMAT;
use crate::message::{
    LogLevel, LogRecord, ResponseEnvelope, StatusCode, TelemetryBatch, TelemetryRecord,
};
use crate::pipeline::QueueHandle;
use crate::plugin::{PluginChain, TelemetryMetricReceived, TelemetryMetricResponse};
use chrono::Utc;
use tracing::{debug, trace};

/// Category of log records mirrored from telemetry
pub const TELEMETRY_CATEGORY: &str = "Telemetry";

#[derive(Clone)]
pub struct TelemetryProcessor {
    plugins: PluginChain,
    queue: QueueHandle,
    mirror_to_log: bool,
}

impl TelemetryProcessor {
    pub fn new(plugins: PluginChain, queue: QueueHandle, mirror_to_log: bool) -> Self {
        Self {
            plugins,
            queue,
            mirror_to_log,
        }
    }

    /// Run one metric through both telemetry extension points.
    ///
    /// `None` means plugins nullified the metric or its response and the
    /// message is dropped.
    pub async fn process(
        &self,
        record: TelemetryRecord,
        source_app_id: &str,
    ) -> Option<(TelemetryRecord, ResponseEnvelope)> {
        let mut record = record;
        if record.metric_time.is_none() {
            record.metric_time = Some(Utc::now());
        }

        let tracking_id = record.request_header.tracking_id.clone();
        let correlation_id = record.request_header.correlation_id.clone();

        debug!(
            source_app_id = %source_app_id,
            metric = %record.metric_name,
            tracking_id = %tracking_id,
            correlation_id = %correlation_id,
            "Processing telemetry metric"
        );

        let Some(record) = self
            .plugins
            .run_single::<TelemetryMetricReceived>(Some(record))
            .await
        else {
            debug!(
                source_app_id = %source_app_id,
                tracking_id = %tracking_id,
                correlation_id = %correlation_id,
                "Plugins nullified telemetry metric, dropping"
            );
            return None;
        };

        let response = ResponseEnvelope::for_request(&record.request_header, StatusCode::Successful);

        if self.mirror_to_log {
            trace!(
                tracking_id = %tracking_id,
                correlation_id = %correlation_id,
                "Mirroring telemetry metric to log"
            );
            self.queue.enqueue(mirror_log_record(&record));
        }

        let (request, response) = self
            .plugins
            .run::<TelemetryMetricResponse>(Some(record), Some(response))
            .await;

        match (request, response) {
            (Some(record), Some(response)) => Some((record, response)),
            _ => {
                trace!(
                    source_app_id = %source_app_id,
                    tracking_id = %tracking_id,
                    correlation_id = %correlation_id,
                    "Plugins nullified telemetry response, dropping"
                );
                None
            }
        }
    }

    /// Process every metric of a batch; dropped metrics do not abort the rest.
    pub async fn process_batch(&self, batch: TelemetryBatch, source_app_id: &str) -> ResponseEnvelope {
        let total = batch.metrics.len();
        let mut processed = 0;

        debug!(
            source_app_id = %source_app_id,
            metrics = total,
            tracking_id = %batch.request_header.tracking_id,
            "Processing telemetry batch"
        );

        for metric in batch.metrics {
            if self.process(metric, source_app_id).await.is_some() {
                processed += 1;
            }
        }

        let mut response = ResponseEnvelope::for_request(&batch.request_header, StatusCode::Successful);
        response.message = Some(format!("processed {} of {} metrics", processed, total));
        response
    }
}

fn mirror_log_record(metric: &TelemetryRecord) -> LogRecord {
    let mut record = LogRecord {
        request_header: metric.request_header.clone(),
        category: TELEMETRY_CATEGORY.to_string(),
        sub_category: metric.metric_name.clone(),
        message: metric.metric_value.to_string(),
        log_level: LogLevel::Telemetry,
        ..Default::default()
    };
    if let Some(at) = metric.metric_time {
        record.log_received_time = Some(at);
        record.log_time_user_readable = at.format(USER_READABLE_FORMAT).to_string();
    }
    record
}
