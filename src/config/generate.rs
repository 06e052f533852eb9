pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# LOGWELL CONFIGURATION
# =============================================================================
# Logwell accepts log and telemetry records over HTTP, runs them through the
# configured plugins, appends them to rotating files and hands completed files
# to a transfer service.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/logwell/config.yml
#   3. /etc/logwell/config.yml
#
# $env{VAR} is replaced with the value of environment variable VAR.

# =============================================================================
# STORAGE
# =============================================================================
storage:
  # Directory holding the active file plus files waiting for downlink
  output_dir: /var/lib/logwell/logs
  # Files are named <prefix>-<DD-MM-YY-HH.mm.ss>.<extension>
  file_prefix: logwell
  file_extension: json
  # A new file is cut once the active one passes 90% of this size
  max_file_size_kb: 10240
  # ... or once it is older than this
  max_file_ttl: 15m

# =============================================================================
# PIPELINE
# =============================================================================
pipeline:
  # Sleep between drain cycles of the writer
  heartbeat_interval_ms: 3000
  # Also persist every accepted telemetry metric as a log line
  mirror_telemetry_to_log: true

# =============================================================================
# DOWNLINK
# =============================================================================
downlink:
  destination_app_id: platform-mts
  subdirectory: logs
  # Transfer requests expire this long after they are issued
  expiration_horizon: 12h
  transport:
    # 'outbox' moves files into a local directory; 'http' posts link
    # requests to a link service (type: http, url: http://...)
    type: outbox
    path: /var/lib/logwell/outbox

# =============================================================================
# PLUGINS
# =============================================================================
# Lower processing_order runs first. Permissions: all, log_message_received,
# telemetry_metric_received, telemetry_metric_response, pre_write_to_log,
# post_write_to_log
plugins:
  - name: drop-noise
    processing_order: 10
    permissions: [pre_write_to_log]
    builtin:
      type: category_filter
      categories: [Noise]

# =============================================================================
# WEB
# =============================================================================
web:
  listen: "127.0.0.1:7878"
"#
    .to_string()
}
