//! Health check over the output directory.
//!
//! A working sidecar has exactly one active file, plus at most one rotated
//! file waiting for its downlink pass. No files means nothing is being
//! written; more than two means downlink is falling behind.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Largest file count still considered healthy
pub const MAX_HEALTHY_FILES: usize = 2;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthReport {
    pub healthy: bool,
    pub file_count: usize,
}

pub fn is_healthy(file_count: usize) -> bool {
    (1..=MAX_HEALTHY_FILES).contains(&file_count)
}

#[derive(Debug, Clone)]
pub struct LivenessMonitor {
    output_dir: PathBuf,
}

impl LivenessMonitor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Count the files in the output directory. An unreadable directory
    /// reports zero files and is therefore unhealthy.
    pub async fn check(&self) -> HealthReport {
        let file_count = match count_files(&self.output_dir).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    dir = %self.output_dir.display(),
                    error = %e,
                    "Failed to read output directory for health check"
                );
                0
            }
        };

        HealthReport {
            healthy: is_healthy(file_count),
            file_count,
        }
    }
}

async fn count_files(dir: &Path) -> std::io::Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_predicate_bounds() {
        assert!(!is_healthy(0));
        assert!(is_healthy(1));
        assert!(is_healthy(2));
        assert!(!is_healthy(3));
        assert!(!is_healthy(10));
    }

    #[tokio::test]
    async fn test_check_counts_files() {
        let dir = TempDir::new().unwrap();
        let monitor = LivenessMonitor::new(dir.path());

        assert_eq!(
            monitor.check().await,
            HealthReport {
                healthy: false,
                file_count: 0
            }
        );

        fs::write(dir.path().join("a.json"), "").unwrap();
        assert!(monitor.check().await.healthy);

        fs::write(dir.path().join("b.json"), "").unwrap();
        assert!(monitor.check().await.healthy);

        fs::write(dir.path().join("c.json"), "").unwrap();
        let report = monitor.check().await;
        assert!(!report.healthy);
        assert_eq!(report.file_count, 3);
    }

    #[tokio::test]
    async fn test_subdirectories_are_not_counted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.json"), "").unwrap();

        let report = LivenessMonitor::new(dir.path()).check().await;
        assert_eq!(report.file_count, 1);
        assert!(report.healthy);
    }

    #[tokio::test]
    async fn test_missing_directory_is_unhealthy() {
        let dir = TempDir::new().unwrap();
        let report = LivenessMonitor::new(dir.path().join("missing")).check().await;
        assert!(!report.healthy);
    }
}
