use crate::message::{LogRecord, ResponseEnvelope, StatusCode};
use crate::pipeline::QueueHandle;
use crate::plugin::{LogMessageReceived, PluginChain};
use chrono::Utc;
use tracing::{debug, trace};

#[derive(Clone)]
pub struct LogMessageHandler {
    plugins: PluginChain,
    queue: QueueHandle,
}

impl LogMessageHandler {
    pub fn new(plugins: PluginChain, queue: QueueHandle) -> Self {
        Self { plugins, queue }
    }

    /// Accept a log record from `source_app_id`.
    ///
    /// Returns the response to send back, or `None` when the record was
    /// dropped by plugins or came from the internal mirroring path.
    pub async fn handle(&self, record: LogRecord, source_app_id: &str) -> Option<ResponseEnvelope> {
        if record == LogRecord::default() {
            debug!(source_app_id = %source_app_id, "Received empty log record, discarding");
            return None;
        }

        let response = ResponseEnvelope::for_request(&record.request_header, StatusCode::Successful);
        let tracking_id = record.tracking_id().to_string();
        let correlation_id = record.correlation_id().to_string();

        let mut record = record;
        record.stamp_received(Utc::now());

        trace!(
            source_app_id = %source_app_id,
            tracking_id = %tracking_id,
            correlation_id = %correlation_id,
            "Passing log record to plugins"
        );

        let (request, response) = self
            .plugins
            .run::<LogMessageReceived>(Some(record), Some(response))
            .await;

        let (Some(record), Some(response)) = (request, response) else {
            trace!(
                source_app_id = %source_app_id,
                tracking_id = %tracking_id,
                correlation_id = %correlation_id,
                "Plugins nullified log record or response, dropping"
            );
            return None;
        };

        let internal = record.is_internal();
        self.queue.enqueue(record);

        // Answering the internal logger would feed its own response back in
        if internal {
            return None;
        }

        Some(response)
    }
}
