//! Host liveness types shared by the round engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// Confirmed liveness of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Up,
    Down,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Up => "up",
            LinkState::Down => "down",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-host liveness record, owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostState {
    pub address: String,
    pub confirmed: LinkState,
    /// Consecutive unreachable results since the last confirmed up.
    pub fail_streak: u32,
    /// Consecutive reachable results while confirmed down (damped recovery only).
    pub recover_streak: u32,
    /// Time of the last applied probe result.
    #[serde(with = "unix_millis")]
    pub last_updated: SystemTime,
}

impl HostState {
    pub fn new(address: impl Into<String>, confirmed: LinkState) -> Self {
        Self {
            address: address.into(),
            confirmed,
            fail_streak: 0,
            recover_streak: 0,
            last_updated: SystemTime::now(),
        }
    }
}

/// Immutable snapshot handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeJob {
    pub round: u64,
    pub address: String,
    pub fail_streak: u32,
    pub confirmed: LinkState,
}

impl ProbeJob {
    pub fn from_state(round: u64, state: &HostState) -> Self {
        Self {
            round,
            address: state.address.clone(),
            fail_streak: state.fail_streak,
            confirmed: state.confirmed,
        }
    }
}

/// Raw outcome of one probe, produced by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub round: u64,
    pub address: String,
    pub reachable: bool,
    pub observed_at: SystemTime,
}

/// A confirmed change of a host's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: Uuid,
    pub round: u64,
    pub address: String,
    pub from: LinkState,
    pub to: LinkState,
    #[serde(with = "unix_millis")]
    pub at: SystemTime,
}

impl Transition {
    pub fn new(round: u64, prior: &HostState, next: &HostState) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            address: next.address.clone(),
            from: prior.confirmed,
            to: next.confirmed,
            at: next.last_updated,
        }
    }
}

/// Serde adapter storing a `SystemTime` as milliseconds since the Unix epoch.
pub mod unix_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_transition_wire_format() {
        let mut prior = HostState::new("10.0.0.1", LinkState::Up);
        prior.last_updated = UNIX_EPOCH;
        let mut next = prior.clone();
        next.confirmed = LinkState::Down;
        next.last_updated = UNIX_EPOCH + Duration::from_millis(1_500);

        let transition = Transition::new(7, &prior, &next);
        let json = serde_json::to_value(&transition).unwrap();

        assert_eq!(json["address"], "10.0.0.1");
        assert_eq!(json["from"], "up");
        assert_eq!(json["to"], "down");
        assert_eq!(json["round"], 7);
        assert_eq!(json["at"], 1_500);
    }

    #[test]
    fn test_job_snapshot_is_detached() {
        let mut state = HostState::new("10.0.0.2", LinkState::Up);
        state.fail_streak = 2;
        let job = ProbeJob::from_state(3, &state);

        state.fail_streak = 5;
        assert_eq!(job.fail_streak, 2);
        assert_eq!(job.round, 3);
    }
}
