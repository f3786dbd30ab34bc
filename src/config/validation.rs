//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, timeouts ordered)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CheckerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use crate::config::schema::{CheckerConfig, RecoveryPolicy};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("engine.max_fails_count must be greater than zero")]
    ZeroMaxFails,

    #[error("engine.worker_pool_size must be greater than zero")]
    ZeroWorkers,

    #[error("engine.recovery.successes must be greater than zero")]
    ZeroRecoverySuccesses,

    #[error("probe.timeout_ms must be greater than zero")]
    ZeroProbeTimeout,

    #[error("engine.round_timeout_secs ({round_ms} ms) must exceed probe.timeout_ms ({probe_ms} ms)")]
    RoundTimeoutTooShort { round_ms: u64, probe_ms: u64 },

    #[error("sinks.webhook.url is invalid: {0}")]
    InvalidWebhookUrl(String),

    #[error("sinks.webhook.max_attempts must be greater than zero")]
    ZeroWebhookAttempts,

    #[error("{field} is not a valid socket address: {value}")]
    InvalidBindAddress { field: &'static str, value: String },
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &CheckerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.engine.max_fails_count == 0 {
        errors.push(ValidationError::ZeroMaxFails);
    }
    if config.engine.worker_pool_size == 0 {
        errors.push(ValidationError::ZeroWorkers);
    }
    if let RecoveryPolicy::Damped { successes: 0 } = config.engine.recovery {
        errors.push(ValidationError::ZeroRecoverySuccesses);
    }

    if config.probe.timeout_ms == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }
    let round_ms = config.engine.round_timeout_secs.saturating_mul(1000);
    if round_ms <= config.probe.timeout_ms {
        errors.push(ValidationError::RoundTimeoutTooShort {
            round_ms,
            probe_ms: config.probe.timeout_ms,
        });
    }

    if let Some(webhook) = &config.sinks.webhook {
        if let Err(e) = url::Url::parse(&webhook.url) {
            errors.push(ValidationError::InvalidWebhookUrl(e.to_string()));
        }
        if webhook.max_attempts == 0 {
            errors.push(ValidationError::ZeroWebhookAttempts);
        }
    }

    if config.status.enabled && config.status.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field: "status.bind_address",
            value: config.status.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidBindAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
