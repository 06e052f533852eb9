use crate::plugin::{PermissionName, DEFAULT_PROCESSING_ORDER};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub downlink: DownlinkConfig,
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the active file and files awaiting downlink
    pub output_dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    pub max_file_size_kb: u64,
    #[serde(with = "humantime_serde")]
    pub max_file_ttl: Duration,
}

fn default_file_prefix() -> String {
    "logwell".to_string()
}

fn default_file_extension() -> String {
    "json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default)]
    pub mirror_telemetry_to_log: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            mirror_telemetry_to_log: false,
        }
    }
}

impl PipelineConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

fn default_heartbeat_interval_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownlinkConfig {
    #[serde(default = "default_destination_app_id")]
    pub destination_app_id: String,
    #[serde(default = "default_subdirectory")]
    pub subdirectory: String,
    #[serde(default = "default_expiration_horizon", with = "humantime_serde")]
    pub expiration_horizon: Duration,
    pub transport: TransportConfig,
}

fn default_destination_app_id() -> String {
    "platform-mts".to_string()
}

fn default_subdirectory() -> String {
    "logs".to_string()
}

fn default_expiration_horizon() -> Duration {
    Duration::from_secs(12 * 3600)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Move completed files into a local outbox directory
    Outbox { path: PathBuf },
    /// POST link requests to a link service
    Http { url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default = "default_processing_order")]
    pub processing_order: i32,
    pub permissions: Vec<PermissionName>,
    pub builtin: BuiltinPlugin,
}

fn default_processing_order() -> i32 {
    DEFAULT_PROCESSING_ORDER
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuiltinPlugin {
    CategoryFilter { categories: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub listen: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:7878".to_string(),
        }
    }
}
