//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the checker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the ping checker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CheckerConfig {
    /// Round engine settings (flap damping, pool size, pacing).
    pub engine: EngineConfig,

    /// Reachability probe settings.
    pub probe: ProbeConfig,

    /// Where the initial host set comes from.
    pub seed: SeedConfig,

    /// Transition sinks.
    pub sinks: SinksConfig,

    /// Read-only status API.
    pub status: StatusConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Round engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consecutive unreachable results needed to confirm a host down.
    pub max_fails_count: u32,

    /// Number of probe workers, fixed for the life of the process.
    pub worker_pool_size: usize,

    /// Pause between rounds in milliseconds (0 = back-to-back rounds).
    pub round_interval_ms: u64,

    /// Upper bound on how long a round waits for its results.
    pub round_timeout_secs: u64,

    /// How a down host is brought back up.
    pub recovery: RecoveryPolicy,
}

impl EngineConfig {
    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }

    pub fn round_timeout(&self) -> Duration {
        Duration::from_secs(self.round_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_fails_count: 6,
            worker_pool_size: 10,
            round_interval_ms: 1000,
            round_timeout_secs: 30,
            recovery: RecoveryPolicy::Immediate,
        }
    }
}

/// Recovery (down -> up) damping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RecoveryPolicy {
    /// A single reachable result confirms the host up.
    #[default]
    Immediate,
    /// `successes` consecutive reachable results are needed.
    Damped { successes: u32 },
}

/// Probe implementation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMethod {
    /// ICMP echo through the system `ping` binary.
    #[default]
    Icmp,
    /// TCP connect to `tcp_port`.
    Tcp,
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub method: ProbeMethod,

    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Path or name of the ping binary (icmp method).
    pub ping_binary: String,

    /// Port to connect to (tcp method).
    pub tcp_port: u16,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            method: ProbeMethod::Icmp,
            timeout_ms: 1000,
            ping_binary: "ping".to_string(),
            tcp_port: 80,
        }
    }
}

/// Initial host set configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Hosts listed inline in the config file.
    pub hosts: Vec<String>,

    /// File with one host per line.
    pub hosts_file: Option<String>,

    /// State assumed for hosts with no recorded history.
    pub initial_state: crate::health::LinkState,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            hosts_file: None,
            initial_state: crate::health::LinkState::Up,
        }
    }
}

/// Transition sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinksConfig {
    /// Log every transition.
    pub log: bool,

    /// JSON-lines transition history; also used to seed last known states.
    pub history_path: Option<String>,

    /// Optional outbound webhook.
    pub webhook: Option<WebhookConfig>,
}

impl Default for SinksConfig {
    fn default() -> Self {
        Self {
            log: true,
            history_path: None,
            webhook: None,
        }
    }
}

/// HTTP method used by the webhook sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebhookMethod {
    /// JSON body with the full transition.
    #[default]
    Post,
    /// `address` and `state` query parameters.
    Get,
}

/// Webhook sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    pub url: String,

    #[serde(default)]
    pub method: WebhookMethod,

    /// Request timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,

    /// Total delivery attempts per transition.
    #[serde(default = "default_webhook_attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    #[serde(default = "default_webhook_base_delay")]
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    #[serde(default = "default_webhook_max_delay")]
    pub max_delay_ms: u64,
}

fn default_webhook_timeout() -> u64 {
    5
}

fn default_webhook_attempts() -> u32 {
    3
}

fn default_webhook_base_delay() -> u64 {
    200
}

fn default_webhook_max_delay() -> u64 {
    5000
}

/// Status API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Enable the status API.
    pub enabled: bool,

    /// Bind address for the status API.
    pub bind_address: String,

    /// Bearer token required by the API, if set.
    pub api_key: Option<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
