use crate::message::LogRecord;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{error, trace};

/// Create the ingestion queue: a cloneable producer handle and the single
/// consumer owned by the writer.
pub fn ingestion_queue() -> (QueueHandle, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueHandle { tx }, QueueReceiver { rx })
}

/// Producer side. Enqueueing never waits on the consumer.
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::UnboundedSender<LogRecord>,
}

impl QueueHandle {
    /// Queue a record for the writer. Failures are logged and swallowed.
    pub fn enqueue(&self, record: LogRecord) {
        trace!(
            tracking_id = %record.tracking_id(),
            correlation_id = %record.correlation_id(),
            "Adding log record to queue"
        );

        if let Err(mpsc::error::SendError(record)) = self.tx.send(record) {
            error!(
                tracking_id = %record.tracking_id(),
                correlation_id = %record.correlation_id(),
                "Failure storing log record to queue: writer has shut down"
            );
        }
    }
}

/// Consumer side, owned by the writer loop.
pub struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<LogRecord>,
}

impl QueueReceiver {
    /// Next record if one is immediately available.
    pub fn try_dequeue(&mut self) -> Option<LogRecord> {
        match self.rx.try_recv() {
            Ok(record) => Some(record),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
