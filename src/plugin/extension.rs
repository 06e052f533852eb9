use super::{Pair, Plugin, PluginPermissions, PluginResult};
use crate::message::{LogRecord, ResponseEnvelope, TelemetryRecord};
use futures::future::BoxFuture;

/// A named stage where registered plugins see a (request, response) pair.
///
/// Implementors are marker types; [`PluginChain::run`](super::PluginChain::run)
/// is generic over them so every stage shares one executor.
pub trait ExtensionPoint {
    type Request: Clone + Default + PartialEq + Send + Sync + 'static;
    type Response: Clone + Send + Sync + 'static;

    const NAME: &'static str;
    const PERMISSION: PluginPermissions;

    fn invoke<'a>(
        plugin: &'a dyn Plugin,
        request: Option<Self::Request>,
        response: Option<Self::Response>,
    ) -> BoxFuture<'a, PluginResult<Pair<Self::Request, Self::Response>>>;
}

pub struct LogMessageReceived;

impl ExtensionPoint for LogMessageReceived {
    type Request = LogRecord;
    type Response = ResponseEnvelope;

    const NAME: &'static str = "LogMessageReceived";
    const PERMISSION: PluginPermissions = PluginPermissions::LOG_MESSAGE_RECEIVED;

    fn invoke<'a>(
        plugin: &'a dyn Plugin,
        request: Option<LogRecord>,
        response: Option<ResponseEnvelope>,
    ) -> BoxFuture<'a, PluginResult<Pair<LogRecord, ResponseEnvelope>>> {
        plugin.log_message_received(request, response)
    }
}

/// Single-value stage: the response slot is a unit placeholder.
pub struct TelemetryMetricReceived;

impl ExtensionPoint for TelemetryMetricReceived {
    type Request = TelemetryRecord;
    type Response = ();

    const NAME: &'static str = "TelemetryMetricReceived";
    const PERMISSION: PluginPermissions = PluginPermissions::TELEMETRY_METRIC_RECEIVED;

    fn invoke<'a>(
        plugin: &'a dyn Plugin,
        request: Option<TelemetryRecord>,
        _response: Option<()>,
    ) -> BoxFuture<'a, PluginResult<Pair<TelemetryRecord, ()>>> {
        Box::pin(async move {
            let Some(request) = request else {
                return Ok((None, Some(())));
            };
            let output = plugin.telemetry_metric_received(request).await?;
            Ok((output, Some(())))
        })
    }
}

pub struct TelemetryMetricResponse;

impl ExtensionPoint for TelemetryMetricResponse {
    type Request = TelemetryRecord;
    type Response = ResponseEnvelope;

    const NAME: &'static str = "TelemetryMetricResponse";
    const PERMISSION: PluginPermissions = PluginPermissions::TELEMETRY_METRIC_RESPONSE;

    fn invoke<'a>(
        plugin: &'a dyn Plugin,
        request: Option<TelemetryRecord>,
        response: Option<ResponseEnvelope>,
    ) -> BoxFuture<'a, PluginResult<Pair<TelemetryRecord, ResponseEnvelope>>> {
        plugin.telemetry_metric_response(request, response)
    }
}

pub struct PreWriteToLog;

impl ExtensionPoint for PreWriteToLog {
    type Request = LogRecord;
    type Response = String;

    const NAME: &'static str = "PreWriteToLog";
    const PERMISSION: PluginPermissions = PluginPermissions::PRE_WRITE_TO_LOG;

    fn invoke<'a>(
        plugin: &'a dyn Plugin,
        request: Option<LogRecord>,
        response: Option<String>,
    ) -> BoxFuture<'a, PluginResult<Pair<LogRecord, String>>> {
        plugin.pre_write_to_log(request, response)
    }
}

pub struct PostWriteToLog;

impl ExtensionPoint for PostWriteToLog {
    type Request = LogRecord;
    type Response = String;

    const NAME: &'static str = "PostWriteToLog";
    const PERMISSION: PluginPermissions = PluginPermissions::POST_WRITE_TO_LOG;

    fn invoke<'a>(
        plugin: &'a dyn Plugin,
        request: Option<LogRecord>,
        response: Option<String>,
    ) -> BoxFuture<'a, PluginResult<Pair<LogRecord, String>>> {
        plugin.post_write_to_log(request, response)
    }
}
