use crate::config::types::StorageConfig;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Fraction of `max_size_kb` at which a file is considered full.
pub const SOFT_SIZE_THRESHOLD: f64 = 0.9;

/// Timestamp layout embedded in file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%d-%m-%y-%H.%M.%S";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationPolicy {
    pub max_ttl: Duration,
    pub max_size_kb: u64,
    pub soft_threshold: f64,
}

impl RotationPolicy {
    pub fn new(max_ttl: Duration, max_size_kb: u64) -> Self {
        Self {
            max_ttl,
            max_size_kb,
            soft_threshold: SOFT_SIZE_THRESHOLD,
        }
    }

    fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - created_at).to_std() {
            Ok(age) => age > self.max_ttl,
            // Clock went backwards; keep the current file
            Err(_) => false,
        }
    }

    fn is_full(&self, size_bytes: u64) -> bool {
        (size_bytes / 1024) as f64 > self.max_size_kb as f64 * self.soft_threshold
    }
}

/// `<prefix>-<DD-MM-YY-HH.mm.ss>.<extension>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    pub prefix: String,
    pub extension: String,
}

impl FileNaming {
    pub fn file_name(&self, created_at: DateTime<Utc>) -> String {
        format!(
            "{}-{}.{}",
            self.prefix,
            created_at.format(FILE_TIMESTAMP_FORMAT),
            self.extension
        )
    }
}

/// Decide the creation timestamp of the file to write to.
///
/// `size_of` returns the on-disk size in bytes of the file named for a given
/// creation time, or `None` when it does not exist.
pub fn next_creation_time<F>(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: &RotationPolicy,
    size_of: F,
) -> DateTime<Utc>
where
    F: Fn(DateTime<Utc>) -> Option<u64>,
{
    let mut created_at = created_at;

    if policy.is_expired(created_at, now) {
        created_at = now;
    }

    if size_of(created_at).is_some_and(|size| policy.is_full(size)) {
        created_at = now;
    }

    created_at
}

/// Owns the creation timestamp of the active file. Only the writer task
/// holds one, so the state is never shared across threads.
#[derive(Debug)]
pub struct RotationManager {
    output_dir: PathBuf,
    naming: FileNaming,
    policy: RotationPolicy,
    created_at: DateTime<Utc>,
}

impl RotationManager {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        naming: FileNaming,
        policy: RotationPolicy,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            naming,
            policy,
            created_at,
        }
    }

    pub fn from_config(config: &StorageConfig, now: DateTime<Utc>) -> Self {
        Self::new(
            config.output_dir.clone(),
            FileNaming {
                prefix: config.file_prefix.clone(),
                extension: config.file_extension.clone(),
            },
            RotationPolicy::new(config.max_file_ttl, config.max_file_size_kb),
            now,
        )
    }

    /// Evaluate the rotation policy and return the path of the active file.
    pub async fn current_file(&mut self, now: DateTime<Utc>) -> PathBuf {
        let created_at = self.created_at;
        let current_size = tokio::fs::metadata(self.path_for(created_at))
            .await
            .ok()
            .map(|m| m.len());

        // Only the current file can be full: a file cut now already carries
        // the name a size rotation would give it
        let next = next_creation_time(created_at, now, &self.policy, |ts| {
            current_size.filter(|_| ts == created_at)
        });

        if next != self.created_at {
            info!(
                previous = %self.naming.file_name(self.created_at),
                next = %self.naming.file_name(next),
                "Cutting new log file"
            );
            self.created_at = next;
        } else {
            debug!(file = %self.naming.file_name(next), "Keeping current log file");
        }

        self.path_for(self.created_at)
    }

    fn path_for(&self, created_at: DateTime<Utc>) -> PathBuf {
        self.output_dir.join(self.naming.file_name(created_at))
    }
}
