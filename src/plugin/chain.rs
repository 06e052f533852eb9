use super::{ExtensionPoint, Pair, PluginRegistration};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Ordered, immutable list of plugins shared by every caller.
///
/// Plugins run strictly one after another on the calling task. A plugin that
/// returns an error or panics is logged and skipped; the pair produced by the
/// previous plugin carries on to the next one.
#[derive(Clone, Default)]
pub struct PluginChain {
    plugins: Arc<Vec<PluginRegistration>>,
}

impl PluginChain {
    /// Sort registrations by processing order (stable for equal ranks).
    pub fn new(mut registrations: Vec<PluginRegistration>) -> Self {
        registrations.sort_by_key(|r| r.processing_order);
        Self {
            plugins: Arc::new(registrations),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn registrations(&self) -> &[PluginRegistration] {
        &self.plugins
    }

    /// Run every permitted plugin for extension point `P`.
    ///
    /// An absent or default request skips the remaining plugins and the pair
    /// is returned unchanged. Callers must treat `None` in either slot of the
    /// result as "drop this message".
    pub async fn run<P: ExtensionPoint>(
        &self,
        request: Option<P::Request>,
        response: Option<P::Response>,
    ) -> Pair<P::Request, P::Response> {
        let mut request = request;
        let mut response = response;

        for registration in self.plugins.iter() {
            let name = registration.name();

            if !registration.permissions.contains(P::PERMISSION) {
                trace!(plugin = %name, extension_point = P::NAME, "Plugin not permitted, skipping");
                continue;
            }

            match &request {
                Some(r) if *r != <P::Request as Default>::default() => {}
                _ => {
                    debug!(
                        plugin = %name,
                        extension_point = P::NAME,
                        "Received empty input, returning empty results"
                    );
                    return (request, response);
                }
            }

            debug!(plugin = %name, extension_point = P::NAME, "START");

            let call = P::invoke(registration.plugin.as_ref(), request.clone(), response.clone());
            match AssertUnwindSafe(call).catch_unwind().await {
                Ok(Ok((next_request, next_response))) => {
                    request = next_request;
                    response = next_response;
                }
                Ok(Err(e)) => {
                    error!(plugin = %name, extension_point = P::NAME, error = %e, "Error in plugin");
                }
                Err(_) => {
                    error!(plugin = %name, extension_point = P::NAME, "Plugin panicked");
                }
            }

            debug!(plugin = %name, extension_point = P::NAME, "END");
        }

        (request, response)
    }

    /// Run a single-value extension point such as `TelemetryMetricReceived`.
    pub async fn run_single<P>(&self, request: Option<P::Request>) -> Option<P::Request>
    where
        P: ExtensionPoint<Response = ()>,
    {
        self.run::<P>(request, Some(())).await.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{LogRecord, ResponseEnvelope, StatusCode, TelemetryRecord};
    use crate::plugin::{
        LogMessageReceived, Plugin, PluginError, PluginPermissions, PluginResult, PreWriteToLog,
        TelemetryMetricReceived,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Appends its tag to the record message and records the call order.
    struct Tagger {
        tag: &'static str,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Plugin for Tagger {
        fn name(&self) -> &str {
            self.tag
        }

        async fn log_message_received(
            &self,
            request: Option<LogRecord>,
            response: Option<ResponseEnvelope>,
        ) -> PluginResult<Pair<LogRecord, ResponseEnvelope>> {
            self.calls.lock().unwrap().push(self.tag);
            let request = request.map(|mut r| {
                r.message.push_str(self.tag);
                r
            });
            Ok((request, response))
        }
    }

    struct Failing;

    #[async_trait]
    impl Plugin for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn log_message_received(
            &self,
            _request: Option<LogRecord>,
            _response: Option<ResponseEnvelope>,
        ) -> PluginResult<Pair<LogRecord, ResponseEnvelope>> {
            Err(PluginError::Failed("boom".to_string()))
        }

        async fn telemetry_metric_received(
            &self,
            _request: TelemetryRecord,
        ) -> PluginResult<Option<TelemetryRecord>> {
            Err(PluginError::Failed("boom".to_string()))
        }
    }

    struct Panicking;

    #[async_trait]
    impl Plugin for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn log_message_received(
            &self,
            _request: Option<LogRecord>,
            _response: Option<ResponseEnvelope>,
        ) -> PluginResult<Pair<LogRecord, ResponseEnvelope>> {
            panic!("plugin bug");
        }
    }

    struct Nullifier;

    #[async_trait]
    impl Plugin for Nullifier {
        fn name(&self) -> &str {
            "nullifier"
        }

        async fn log_message_received(
            &self,
            _request: Option<LogRecord>,
            response: Option<ResponseEnvelope>,
        ) -> PluginResult<Pair<LogRecord, ResponseEnvelope>> {
            Ok((None, response))
        }

        async fn pre_write_to_log(
            &self,
            _request: Option<LogRecord>,
            file_name: Option<String>,
        ) -> PluginResult<Pair<LogRecord, String>> {
            Ok((None, file_name))
        }
    }

    fn tagger(tag: &'static str, order: i32, calls: &Arc<Mutex<Vec<&'static str>>>) -> PluginRegistration {
        PluginRegistration::new(
            Arc::new(Tagger {
                tag,
                calls: calls.clone(),
            }),
            order,
            PluginPermissions::ALL,
        )
    }

    fn record() -> LogRecord {
        LogRecord {
            category: "App".to_string(),
            ..Default::default()
        }
    }

    fn envelope() -> ResponseEnvelope {
        ResponseEnvelope {
            status: StatusCode::Successful,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_plugins_run_in_processing_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = PluginChain::new(vec![
            tagger("c", 300, &calls),
            tagger("a", 100, &calls),
            tagger("b", 200, &calls),
        ]);

        let (request, response) = chain
            .run::<LogMessageReceived>(Some(record()), Some(envelope()))
            .await;

        assert_eq!(*calls.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(request.unwrap().message, "abc");
        assert_eq!(response.unwrap().status, StatusCode::Successful);
    }

    #[tokio::test]
    async fn test_failing_plugin_passes_previous_pair_through() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = PluginChain::new(vec![
            tagger("a", 1, &calls),
            PluginRegistration::new(Arc::new(Failing), 2, PluginPermissions::ALL),
            tagger("b", 3, &calls),
        ]);

        let (request, response) = chain
            .run::<LogMessageReceived>(Some(record()), Some(envelope()))
            .await;

        assert_eq!(request.unwrap().message, "ab");
        assert!(response.is_some());
    }

    #[tokio::test]
    async fn test_panicking_plugin_is_isolated() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = PluginChain::new(vec![
            PluginRegistration::new(Arc::new(Panicking), 1, PluginPermissions::ALL),
            tagger("a", 2, &calls),
        ]);

        let (request, _) = chain
            .run::<LogMessageReceived>(Some(record()), Some(envelope()))
            .await;

        assert_eq!(request.unwrap().message, "a");
    }

    #[tokio::test]
    async fn test_nullification_skips_later_plugins() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = PluginChain::new(vec![
            PluginRegistration::new(Arc::new(Nullifier), 1, PluginPermissions::ALL),
            tagger("a", 2, &calls),
        ]);

        let (request, response) = chain
            .run::<LogMessageReceived>(Some(record()), Some(envelope()))
            .await;

        assert!(request.is_none());
        assert!(response.is_some());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_default_request_is_returned_unchanged() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let chain = PluginChain::new(vec![tagger("a", 1, &calls)]);

        let (request, _) = chain
            .run::<LogMessageReceived>(Some(LogRecord::default()), Some(envelope()))
            .await;

        assert_eq!(request, Some(LogRecord::default()));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permissions_gate_extension_points() {
        let chain = PluginChain::new(vec![PluginRegistration::new(
            Arc::new(Nullifier),
            1,
            PluginPermissions::LOG_MESSAGE_RECEIVED,
        )]);

        let (request, _) = chain
            .run::<PreWriteToLog>(Some(record()), Some("file.json".to_string()))
            .await;
        assert!(request.is_some());

        let (request, _) = chain
            .run::<LogMessageReceived>(Some(record()), Some(envelope()))
            .await;
        assert!(request.is_none());
    }

    #[tokio::test]
    async fn test_single_value_chain_survives_failures() {
        let chain = PluginChain::new(vec![PluginRegistration::new(
            Arc::new(Failing),
            1,
            PluginPermissions::ALL,
        )]);
        let metric = TelemetryRecord {
            metric_name: "cpu".to_string(),
            metric_value: 0.5,
            ..Default::default()
        };

        let output = chain
            .run_single::<TelemetryMetricReceived>(Some(metric.clone()))
            .await;

        assert_eq!(output, Some(metric));
    }
}
