//! Third-party plugins observing or transforming messages at extension points.
//!
//! A plugin implements [`Plugin`]; every hook has a pass-through default so an
//! implementation only overrides the points it cares about. Returning `None`
//! for the request (or the response, where there is one) nullifies the
//! message and the caller drops it.

pub mod builtin;
pub mod chain;
pub mod extension;
pub mod permissions;

use crate::message::{LogRecord, ResponseEnvelope, TelemetryRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use chain::PluginChain;
pub use extension::{
    ExtensionPoint, LogMessageReceived, PostWriteToLog, PreWriteToLog, TelemetryMetricReceived,
    TelemetryMetricResponse,
};
pub use permissions::{PermissionName, PluginPermissions};

/// Processing order used when a registration does not specify one.
pub const DEFAULT_PROCESSING_ORDER: i32 = 100;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{0}")]
    Failed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PluginResult<T> = Result<T, PluginError>;

/// Pair handed from one plugin to the next.
pub type Pair<Req, Resp> = (Option<Req>, Option<Resp>);

#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    async fn log_message_received(
        &self,
        request: Option<LogRecord>,
        response: Option<ResponseEnvelope>,
    ) -> PluginResult<Pair<LogRecord, ResponseEnvelope>> {
        Ok((request, response))
    }

    async fn telemetry_metric_received(
        &self,
        request: TelemetryRecord,
    ) -> PluginResult<Option<TelemetryRecord>> {
        Ok(Some(request))
    }

    async fn telemetry_metric_response(
        &self,
        request: Option<TelemetryRecord>,
        response: Option<ResponseEnvelope>,
    ) -> PluginResult<Pair<TelemetryRecord, ResponseEnvelope>> {
        Ok((request, response))
    }

    /// `file_name` is the file the record is about to be appended to.
    async fn pre_write_to_log(
        &self,
        request: Option<LogRecord>,
        file_name: Option<String>,
    ) -> PluginResult<Pair<LogRecord, String>> {
        Ok((request, file_name))
    }

    async fn post_write_to_log(
        &self,
        request: Option<LogRecord>,
        file_name: Option<String>,
    ) -> PluginResult<Pair<LogRecord, String>> {
        Ok((request, file_name))
    }
}

/// A loaded plugin together with its rank and permissions.
#[derive(Clone)]
pub struct PluginRegistration {
    pub processing_order: i32,
    pub permissions: PluginPermissions,
    pub plugin: Arc<dyn Plugin>,
}

impl PluginRegistration {
    pub fn new(plugin: Arc<dyn Plugin>, processing_order: i32, permissions: PluginPermissions) -> Self {
        Self {
            processing_order,
            permissions,
            plugin,
        }
    }

    pub fn name(&self) -> &str {
        self.plugin.name()
    }
}

impl std::fmt::Debug for PluginRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistration")
            .field("name", &self.name())
            .field("processing_order", &self.processing_order)
            .field("permissions", &self.permissions)
            .finish()
    }
}
