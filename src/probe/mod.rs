//! Reachability probing.
//!
//! # Responsibilities
//! - Define the `Prober` capability used by the worker pool
//! - Provide ICMP (system ping) and TCP connect implementations
//!
//! # Design Decisions
//! - A prober reports reachable/unreachable; it never retries
//! - Implementations honour the timeout they are given, and the worker
//!   bounds the call again so a misbehaving prober cannot stall a worker
//! - Errors are returned, not logged; the worker decides how to report them

pub mod icmp;
pub mod tcp;

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use thiserror::Error;
use crate::config::{ProbeConfig, ProbeMethod};

pub use icmp::IcmpProber;
pub use tcp::TcpProber;

/// Errors raised by a prober itself, as opposed to "no answer".
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe helper could not be started.
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The probe helper ran but reported an error (bad address, no route, ...).
    #[error("probe of {address} failed with exit code {code:?}")]
    Failed { address: String, code: Option<i32> },

    /// The address could not be resolved.
    #[error("cannot resolve {0}")]
    Resolve(String),
}

/// A single reachability check against one address.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` when the host answered within `timeout`.
    async fn probe(&self, address: &str, timeout: Duration) -> Result<bool, ProbeError>;
}

/// Build the prober selected by the configuration.
pub fn build_prober(config: &ProbeConfig) -> Arc<dyn Prober> {
    match config.method {
        ProbeMethod::Icmp => Arc::new(IcmpProber::new(config.ping_binary.clone())),
        ProbeMethod::Tcp => Arc::new(TcpProber::new(config.tcp_port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prober_by_method() {
        let mut config = ProbeConfig::default();
        assert_eq!(build_prober(&config).name(), "icmp");

        config.method = ProbeMethod::Tcp;
        assert_eq!(build_prober(&config).name(), "tcp");
    }
}
