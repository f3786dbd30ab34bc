//! ICMP echo probe through the system `ping` binary.
//!
//! Raw ICMP sockets need elevated privileges; delegating to `ping` lets the
//! checker run unprivileged wherever `ping` itself works (setuid binary or
//! `net.ipv4.ping_group_range`).

use std::process::Stdio;
use std::time::Duration;
use async_trait::async_trait;
use tokio::process::Command;
use crate::probe::{Prober, ProbeError};

/// Sends a single echo request per probe.
#[derive(Debug, Clone)]
pub struct IcmpProber {
    binary: String,
}

impl IcmpProber {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    fn command(&self, address: &str, timeout: Duration) -> Command {
        // ping's -W takes whole seconds; never pass 0, which means "no timeout".
        let wait_secs = timeout.as_secs().max(1);

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-c")
            .arg("1")
            .arg("-W")
            .arg(wait_secs.to_string())
            .arg("--")
            .arg(address)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Prober for IcmpProber {
    fn name(&self) -> &'static str {
        "icmp"
    }

    async fn probe(&self, address: &str, timeout: Duration) -> Result<bool, ProbeError> {
        let status = self
            .command(address, timeout)
            .status()
            .await
            .map_err(|source| ProbeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        match status.code() {
            Some(0) => Ok(true),
            // No reply within the deadline.
            Some(1) => Ok(false),
            code => Err(ProbeError::Failed {
                address: address.to_string(),
                code,
            }),
        }
    }
}
