//! Handlers for inbound log and telemetry messages.
//!
//! Both run on the producer's task: they run the receive-side plugin chains,
//! enqueue for the writer and build the response for the sender. Nothing here
//! touches the output directory.

pub mod log;
pub mod telemetry;

pub use log::LogMessageHandler;
pub use telemetry::TelemetryProcessor;
