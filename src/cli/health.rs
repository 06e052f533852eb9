use crate::config::parse::load_config;
use crate::liveness::LivenessMonitor;
use std::path::PathBuf;

/// Evaluate the liveness check once. Returns whether the sidecar is healthy.
pub async fn check(config_path: Option<PathBuf>) -> Result<bool, Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;
    let config = load_config(&path)?;

    let report = LivenessMonitor::new(&config.storage.output_dir).check().await;
    println!(
        "{} ({} files in {})",
        if report.healthy { "healthy" } else { "unhealthy" },
        report.file_count,
        config.storage.output_dir.display()
    );

    Ok(report.healthy)
}
