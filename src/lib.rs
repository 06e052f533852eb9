pub mod cli;
pub mod config;
pub mod downlink;
pub mod ingest;
pub mod liveness;
pub mod message;
pub mod pipeline;
pub mod plugin;
pub mod web;
