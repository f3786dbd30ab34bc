//! Host liveness state machine (flap detector).
//!
//! # States
//! - Up: host answers probes
//! - Down: host confirmed unreachable
//!
//! # State Transitions
//! ```text
//! Up → Down: consecutive unreachable results >= max_fails_count
//! Down → Up: one reachable result (immediate policy)
//!            or recovery successes in a row (damped policy)
//! ```
//!
//! # Design Decisions
//! - Pure function of (prior state, raw result); no I/O, no clock reads
//! - Asymmetric by default: recovery is reported at once, failure is damped
//! - Counters reset on state transition

use std::time::SystemTime;
use crate::config::RecoveryPolicy;
use crate::health::types::{HostState, LinkState};

/// Converts raw probe results into confirmed state changes.
#[derive(Debug, Clone, Copy)]
pub struct FlapDetector {
    max_fails_count: u32,
    recovery: RecoveryPolicy,
}

impl FlapDetector {
    pub fn new(max_fails_count: u32, recovery: RecoveryPolicy) -> Self {
        Self {
            max_fails_count: max_fails_count.max(1),
            recovery,
        }
    }

    pub fn max_fails_count(&self) -> u32 {
        self.max_fails_count
    }

    fn recovery_successes(&self) -> u32 {
        match self.recovery {
            RecoveryPolicy::Immediate => 1,
            RecoveryPolicy::Damped { successes } => successes.max(1),
        }
    }

    /// Apply one raw result to `prior`.
    ///
    /// Returns the next state and whether the confirmed state changed.
    pub fn evaluate(
        &self,
        prior: &HostState,
        reachable: bool,
        observed_at: SystemTime,
    ) -> (HostState, bool) {
        let mut next = prior.clone();
        next.last_updated = observed_at;

        if reachable {
            next.fail_streak = 0;
            match prior.confirmed {
                LinkState::Down => {
                    next.recover_streak = prior.recover_streak.saturating_add(1);
                    if next.recover_streak >= self.recovery_successes() {
                        next.confirmed = LinkState::Up;
                        next.recover_streak = 0;
                        return (next, true);
                    }
                }
                LinkState::Up => next.recover_streak = 0,
            }
            return (next, false);
        }

        next.recover_streak = 0;
        next.fail_streak = prior.fail_streak.saturating_add(1);

        if prior.confirmed == LinkState::Up && next.fail_streak >= self.max_fails_count {
            next.confirmed = LinkState::Down;
            next.fail_streak = 0;
            return (next, true);
        }

        (next, false)
    }
}
