use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Bitmask of extension points a plugin may observe.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PluginPermissions(u8);

impl PluginPermissions {
    pub const NONE: Self = Self(0);
    pub const LOG_MESSAGE_RECEIVED: Self = Self(1 << 0);
    pub const TELEMETRY_METRIC_RECEIVED: Self = Self(1 << 1);
    pub const TELEMETRY_METRIC_RESPONSE: Self = Self(1 << 2);
    pub const PRE_WRITE_TO_LOG: Self = Self(1 << 3);
    pub const POST_WRITE_TO_LOG: Self = Self(1 << 4);
    pub const ALL: Self = Self(
        Self::LOG_MESSAGE_RECEIVED.0
            | Self::TELEMETRY_METRIC_RECEIVED.0
            | Self::TELEMETRY_METRIC_RESPONSE.0
            | Self::PRE_WRITE_TO_LOG.0
            | Self::POST_WRITE_TO_LOG.0,
    );

    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn from_names(names: &[PermissionName]) -> Self {
        names
            .iter()
            .fold(Self::NONE, |acc, name| acc | name.permission())
    }
}

impl BitOr for PluginPermissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for PluginPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginPermissions({:#07b})", self.0)
    }
}

/// Permission names as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionName {
    All,
    LogMessageReceived,
    TelemetryMetricReceived,
    TelemetryMetricResponse,
    PreWriteToLog,
    PostWriteToLog,
}

impl PermissionName {
    pub fn permission(self) -> PluginPermissions {
        match self {
            PermissionName::All => PluginPermissions::ALL,
            PermissionName::LogMessageReceived => PluginPermissions::LOG_MESSAGE_RECEIVED,
            PermissionName::TelemetryMetricReceived => PluginPermissions::TELEMETRY_METRIC_RECEIVED,
            PermissionName::TelemetryMetricResponse => PluginPermissions::TELEMETRY_METRIC_RESPONSE,
            PermissionName::PreWriteToLog => PluginPermissions::PRE_WRITE_TO_LOG,
            PermissionName::PostWriteToLog => PluginPermissions::POST_WRITE_TO_LOG,
        }
    }
}
