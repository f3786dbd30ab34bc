//! Published, read-only view of the registry.
//!
//! The round scheduler replaces the whole snapshot after every round;
//! readers (the status API) load it without locks and never see the
//! registry itself.

use std::sync::Arc;
use std::time::SystemTime;
use arc_swap::ArcSwap;
use serde::Serialize;
use crate::health::{HostState, LinkState, RoundReport};

/// Registry view as of the end of a round.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub round: u64,
    #[serde(with = "crate::health::types::unix_millis")]
    pub published_at: SystemTime,
    pub last_report: Option<RoundReport>,
    pub hosts: Vec<HostState>,
}

impl StatusSnapshot {
    pub fn host(&self, address: &str) -> Option<&HostState> {
        self.hosts.iter().find(|h| h.address == address)
    }

    pub fn count(&self, state: LinkState) -> usize {
        self.hosts.iter().filter(|h| h.confirmed == state).count()
    }
}

#[derive(Debug)]
pub struct StatusBoard {
    current: ArcSwap<StatusSnapshot>,
}

impl StatusBoard {
    pub fn new(hosts: Vec<HostState>) -> Self {
        Self {
            current: ArcSwap::from_pointee(StatusSnapshot {
                round: 0,
                published_at: SystemTime::now(),
                last_report: None,
                hosts,
            }),
        }
    }

    pub fn publish(&self, report: RoundReport, hosts: Vec<HostState>) {
        self.current.store(Arc::new(StatusSnapshot {
            round: report.round,
            published_at: SystemTime::now(),
            last_report: Some(report),
            hosts,
        }));
    }

    pub fn load(&self) -> Arc<StatusSnapshot> {
        self.current.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_publish_replaces_snapshot() {
        let board = StatusBoard::new(vec![HostState::new("10.0.0.1", LinkState::Up)]);
        let before = board.load();
        assert_eq!(before.round, 0);
        assert!(before.last_report.is_none());

        let mut down = HostState::new("10.0.0.1", LinkState::Down);
        down.fail_streak = 0;
        board.publish(
            RoundReport {
                round: 3,
                dispatched: 1,
                applied: 1,
                missing: 0,
                discarded: 0,
                transitions: 1,
                duration: Duration::from_millis(12),
                timed_out: false,
            },
            vec![down],
        );

        let after = board.load();
        assert_eq!(after.round, 3);
        assert_eq!(after.count(LinkState::Down), 1);
        assert_eq!(after.host("10.0.0.1").unwrap().confirmed, LinkState::Down);
        // Readers holding the old snapshot are unaffected.
        assert_eq!(before.count(LinkState::Up), 1);
    }
}
