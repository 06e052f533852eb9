//! The single-writer side of the sidecar: the ingestion queue, file rotation
//! and the heartbeat loop that drains one into the other.

pub mod queue;
pub mod rotation;
pub mod writer;

pub use queue::{ingestion_queue, QueueHandle, QueueReceiver};
pub use rotation::{next_creation_time, FileNaming, RotationManager, RotationPolicy};
pub use writer::{append_record, CycleStats, LogWriter, WriteError};
