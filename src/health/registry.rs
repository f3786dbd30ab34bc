//! Host registry.
//!
//! # Responsibilities
//! - Own every `HostState`, one per address
//! - Hand out detached snapshots for dispatch
//! - Accept updates for known addresses only
//!
//! # Design Decisions
//! - Mutation takes `&mut self`; the round scheduler is the sole owner, so
//!   "reads before writes within a round" holds by construction, no locks
//! - Entries are created once at seed time and never removed

use std::collections::BTreeMap;
use thiserror::Error;
use crate::health::types::{HostState, LinkState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown address: {0}")]
    UnknownAddress(String),

    #[error("address mismatch: entry {expected}, update for {actual}")]
    AddressMismatch { expected: String, actual: String },
}

/// Authoritative address → state mapping.
#[derive(Debug, Default)]
pub struct HostRegistry {
    hosts: BTreeMap<String, HostState>,
}

impl HostRegistry {
    /// Build the registry from seed entries. Later duplicates are ignored.
    pub fn seed<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, LinkState)>,
    {
        let mut hosts = BTreeMap::new();
        for (address, state) in entries {
            if hosts.contains_key(&address) {
                tracing::warn!(address = %address, "Duplicate host in seed, keeping first entry");
                continue;
            }
            hosts.insert(address.clone(), HostState::new(address, state));
        }
        tracing::info!(hosts = hosts.len(), "Host registry seeded");
        Self { hosts }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&HostState> {
        self.hosts.get(address)
    }

    /// Detached copy of every entry, ordered by address.
    pub fn snapshot(&self) -> Vec<HostState> {
        self.hosts.values().cloned().collect()
    }

    /// Replace the entry for `address` with `next`.
    pub fn apply(&mut self, address: &str, next: HostState) -> Result<(), RegistryError> {
        if next.address != address {
            return Err(RegistryError::AddressMismatch {
                expected: address.to_string(),
                actual: next.address,
            });
        }
        match self.hosts.get_mut(address) {
            Some(entry) => {
                *entry = next;
                Ok(())
            }
            None => Err(RegistryError::UnknownAddress(address.to_string())),
        }
    }

    /// Number of hosts per confirmed state, as (up, down).
    pub fn counts(&self) -> (usize, usize) {
        let up = self
            .hosts
            .values()
            .filter(|h| h.confirmed == LinkState::Up)
            .count();
        (up, self.hosts.len() - up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> HostRegistry {
        HostRegistry::seed(vec![
            ("10.0.0.2".to_string(), LinkState::Down),
            ("10.0.0.1".to_string(), LinkState::Up),
            ("10.0.0.2".to_string(), LinkState::Up),
        ])
    }

    #[test]
    fn test_seed_dedupes_and_orders() {
        let registry = seeded();
        assert_eq!(registry.len(), 2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].address, "10.0.0.1");
        assert_eq!(snapshot[1].address, "10.0.0.2");
        assert_eq!(snapshot[1].confirmed, LinkState::Down);
        assert_eq!(registry.counts(), (1, 1));
    }

    #[test]
    fn test_apply_updates_known_host() {
        let mut registry = seeded();
        let mut next = registry.get("10.0.0.1").unwrap().clone();
        next.fail_streak = 3;

        registry.apply("10.0.0.1", next).unwrap();
        assert_eq!(registry.get("10.0.0.1").unwrap().fail_streak, 3);
    }

    #[test]
    fn test_apply_never_inserts() {
        let mut registry = seeded();
        let stranger = HostState::new("10.9.9.9", LinkState::Up);

        assert_eq!(
            registry.apply("10.9.9.9", stranger),
            Err(RegistryError::UnknownAddress("10.9.9.9".into()))
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_apply_rejects_mismatched_state() {
        let mut registry = seeded();
        let other = registry.get("10.0.0.2").unwrap().clone();

        assert!(matches!(
            registry.apply("10.0.0.1", other),
            Err(RegistryError::AddressMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = seeded();
        let snapshot = registry.snapshot();

        let mut next = snapshot[0].clone();
        next.confirmed = LinkState::Down;
        registry.apply("10.0.0.1", next).unwrap();

        assert_eq!(snapshot[0].confirmed, LinkState::Up);
    }
}
