use super::{Pair, Plugin, PluginRegistration, PluginResult};
use crate::config::types::{BuiltinPlugin, PluginConfig};
use crate::message::{LogRecord, ResponseEnvelope};
use crate::plugin::PluginPermissions;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Drops log records whose category is in a configured list.
pub struct CategoryFilter {
    name: String,
    categories: Vec<String>,
}

impl CategoryFilter {
    pub fn new(name: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            name: name.into(),
            categories,
        }
    }

    fn filter(&self, request: Option<LogRecord>) -> Option<LogRecord> {
        let record = request?;
        if self
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&record.category))
        {
            debug!(
                plugin = %self.name,
                category = %record.category,
                tracking_id = %record.tracking_id(),
                "Dropping filtered category"
            );
            return None;
        }
        Some(record)
    }
}

#[async_trait]
impl Plugin for CategoryFilter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn log_message_received(
        &self,
        request: Option<LogRecord>,
        response: Option<ResponseEnvelope>,
    ) -> PluginResult<Pair<LogRecord, ResponseEnvelope>> {
        Ok((self.filter(request), response))
    }

    async fn pre_write_to_log(
        &self,
        request: Option<LogRecord>,
        file_name: Option<String>,
    ) -> PluginResult<Pair<LogRecord, String>> {
        Ok((self.filter(request), file_name))
    }
}

/// Bind each configured plugin entry to its built-in implementation.
pub fn registrations_from_config(plugins: &[PluginConfig]) -> Vec<PluginRegistration> {
    plugins
        .iter()
        .map(|entry| {
            let plugin: Arc<dyn Plugin> = match &entry.builtin {
                BuiltinPlugin::CategoryFilter { categories } => {
                    Arc::new(CategoryFilter::new(entry.name.clone(), categories.clone()))
                }
            };
            PluginRegistration::new(
                plugin,
                entry.processing_order,
                PluginPermissions::from_names(&entry.permissions),
            )
        })
        .collect()
}
