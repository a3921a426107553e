//! Process settings for the refresher itself.
//!
//! All fields have compiled-in defaults; a TOML file may override any
//! section.

use serde::{Deserialize, Serialize};

/// URL of the cloud configuration document.
pub const DEFAULT_PRIMARY_URL: &str = "http://config.getiantem.org/cloud-android.yaml.gz";

/// Alternate route for the same document, sent as a hint header.
pub const DEFAULT_FRONTED_URL: &str = "http://d2wi0vwulmtn99.cloudfront.net/cloud.yaml.gz";

/// Root settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RefreshSettings {
    /// Where the configuration document lives.
    pub endpoints: EndpointSettings,

    /// Fetch behaviour.
    pub fetch: FetchSettings,

    /// Periodic refresh schedule.
    pub schedule: ScheduleSettings,

    /// Logging and metrics.
    pub observability: ObservabilitySettings,
}

/// Endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EndpointSettings {
    /// Primary URL the request is addressed to.
    pub primary_url: String,

    /// Secondary URL passed to the transport as a routing hint.
    pub fronted_url: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            fronted_url: DEFAULT_FRONTED_URL.to_string(),
        }
    }
}

/// When the cached ETag is recorded.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EtagPolicy {
    /// Record on every 200, before the body is parsed.
    #[default]
    OnFetch,
    /// Record only once the body was committed or found unchanged.
    OnCommit,
}

/// Fetch settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FetchSettings {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,

    /// Limit for both the compressed body and the decompressed document.
    pub max_body_bytes: usize,

    pub etag_policy: EtagPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_body_bytes: 4 * 1024 * 1024, // 4MB
            etag_policy: EtagPolicy::OnFetch,
        }
    }
}

/// Schedule settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Seconds between refresh cycles.
    pub interval_secs: u64,

    /// Run a cycle immediately instead of waiting one interval.
    pub run_on_start: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            run_on_start: true,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
