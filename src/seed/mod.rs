//! Initial host set.
//!
//! # Responsibilities
//! - Collect monitored addresses (inline config, hosts file)
//! - Recover each host's last confirmed state from the transition history
//!
//! # Design Decisions
//! - Runs once, before the first round; the registry never grows afterwards
//! - With no host list configured, every address in the history is monitored
//! - Hosts without history start in `initial_state`

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use crate::config::SeedConfig;
use crate::health::LinkState;
use crate::sink::history::load_latest_states;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read hosts file {path}: {source}")]
    HostsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read history {path}: {source}")]
    History {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no hosts to monitor")]
    Empty,
}

/// One address and the state it starts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
    pub address: String,
    pub state: LinkState,
}

/// Parse a hosts list: one address per line, `#` starts a comment.
pub fn parse_hosts(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the seed from the configuration and optional history file.
pub fn load_seed(config: &SeedConfig, history_path: Option<&Path>) -> Result<Vec<SeedEntry>, SeedError> {
    let mut addresses: Vec<String> = config.hosts.iter().map(|h| h.trim().to_string()).collect();

    if let Some(path) = &config.hosts_file {
        let content = fs::read_to_string(path).map_err(|source| SeedError::HostsFile {
            path: path.clone(),
            source,
        })?;
        addresses.extend(parse_hosts(&content));
    }

    let history = match history_path {
        Some(path) => load_latest_states(path).map_err(|source| SeedError::History {
            path: path.display().to_string(),
            source,
        })?,
        None => Default::default(),
    };

    if addresses.is_empty() {
        addresses = history.keys().cloned().collect();
        addresses.sort();
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(addresses.len());
    for address in addresses {
        if address.is_empty() {
            continue;
        }
        if !seen.insert(address.clone()) {
            tracing::warn!(address = %address, "Host listed more than once");
            continue;
        }
        let state = history.get(&address).copied().unwrap_or(config.initial_state);
        entries.push(SeedEntry { address, state });
    }

    if entries.is_empty() {
        return Err(SeedError::Empty);
    }

    let down = entries.iter().filter(|e| e.state == LinkState::Down).count();
    tracing::info!(hosts = entries.len(), down, "Loaded addresses");
    Ok(entries)
}
