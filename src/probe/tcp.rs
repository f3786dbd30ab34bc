//! TCP connect probe.

use std::io::ErrorKind;
use std::time::Duration;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time;
use crate::probe::{Prober, ProbeError};

/// Treats a host as reachable when it completes or actively refuses a
/// TCP handshake on `port`. A refusal still proves the host is alive.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber {
    port: u16,
}

impl TcpProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    fn target(&self, address: &str) -> String {
        // Bare IPv6 literals need brackets before a port can be appended.
        if address.contains(':') && !address.starts_with('[') {
            format!("[{}]:{}", address, self.port)
        } else {
            format!("{}:{}", address, self.port)
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn probe(&self, address: &str, timeout: Duration) -> Result<bool, ProbeError> {
        let target = self.target(address);
        match time::timeout(timeout, TcpStream::connect(&target)).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => Ok(true),
            Ok(Err(e)) if e.kind() == ErrorKind::InvalidInput => Err(ProbeError::Resolve(target)),
            Ok(Err(_)) => Ok(false),
            Err(_) => Ok(false),
        }
    }
}
