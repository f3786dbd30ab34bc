//! Round scheduler.
//!
//! # Responsibilities
//! - Drive rounds: dispatch every host, wait for every result, apply
//! - Feed results through the flap detector and emit confirmed transitions
//! - Publish the registry view after each round
//!
//! # Phases
//! ```text
//! Idle → Dispatching → AwaitingResults → Applying → Idle
//! ```
//!
//! # Design Decisions
//! - The scheduler owns the registry; no other task can write it
//! - A round waits for all of its results, bounded by `round_timeout`
//! - Results tagged with an older round are discarded
//! - A cut-short round cancels its queued jobs, and its missing hosts are
//!   dispatched first next round so a slow tail cannot starve them
//! - All of a round's transitions are queued before the next dispatch

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time;
use crate::config::EngineConfig;
use crate::health::registry::HostRegistry;
use crate::health::state::FlapDetector;
use crate::health::types::{HostState, LinkState, ProbeJob, ProbeResult, Transition};
use crate::health::workers::WorkerPool;
use crate::observability::metrics;
use crate::sink::NotifierHandle;
use crate::status::StatusBoard;

/// Fatal engine conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Every worker has exited; rounds can no longer complete.
    #[error("worker pool exhausted: no workers left to run probes")]
    PoolExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Idle,
    Dispatching,
    AwaitingResults,
    Applying,
}

/// Outcome of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: u64,
    pub dispatched: usize,
    pub applied: usize,
    /// Hosts that had not answered when the grace period ran out.
    pub missing: usize,
    /// Stale, duplicate or unknown results that were dropped.
    pub discarded: usize,
    pub transitions: usize,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub timed_out: bool,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

pub struct RoundScheduler {
    registry: HostRegistry,
    pool: WorkerPool,
    detector: FlapDetector,
    notifier: NotifierHandle,
    board: Option<Arc<StatusBoard>>,
    interval: Duration,
    round_timeout: Duration,
    round: u64,
    phase: RoundPhase,
    /// Hosts left unanswered by the last cut-short round, in dispatch order.
    overdue: Vec<String>,
}

impl RoundScheduler {
    pub fn new(
        registry: HostRegistry,
        pool: WorkerPool,
        notifier: NotifierHandle,
        config: &EngineConfig,
    ) -> Self {
        Self {
            registry,
            pool,
            detector: FlapDetector::new(config.max_fails_count, config.recovery),
            notifier,
            board: None,
            interval: config.round_interval(),
            round_timeout: config.round_timeout(),
            round: 0,
            phase: RoundPhase::Idle,
            overdue: Vec::new(),
        }
    }

    /// Publish the registry to `board` after every round.
    pub fn with_status_board(mut self, board: Arc<StatusBoard>) -> Self {
        self.board = Some(board);
        self
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn rounds_started(&self) -> u64 {
        self.round
    }

    /// Run rounds until `shutdown` fires. An in-flight round is abandoned
    /// without applying its partial results.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<(), EngineError> {
        tracing::info!(
            hosts = self.registry.len(),
            workers = self.pool.size(),
            max_fails = self.detector.max_fails_count(),
            interval_ms = self.interval.as_millis() as u64,
            "Round scheduler starting"
        );

        let outcome = loop {
            match self.execute_round(shutdown.recv()).await {
                Ok(Some(_)) => {}
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => break Ok(()),
            }
        };

        match &outcome {
            Ok(()) => tracing::info!(rounds = self.round, "Round scheduler received shutdown signal, exiting loop"),
            Err(e) => tracing::error!(round = self.round, error = %e, "Round scheduler stopped"),
        }

        let RoundScheduler { pool, .. } = self;
        pool.shutdown(Duration::from_secs(1)).await;
        outcome
    }

    /// Run a single round to completion (or until the grace period ends).
    pub async fn run_round(&mut self) -> Result<RoundReport, EngineError> {
        match self.execute_round(std::future::pending::<()>()).await? {
            Some(report) => Ok(report),
            None => unreachable!("pending future never cancels a round"),
        }
    }

    async fn execute_round<F: Future>(&mut self, cancel: F) -> Result<Option<RoundReport>, EngineError> {
        tokio::pin!(cancel);

        self.round += 1;
        let round = self.round;
        let started = Instant::now();

        // DISPATCHING
        self.phase = RoundPhase::Dispatching;
        let mut pending = HashSet::with_capacity(self.registry.len());
        let mut sent = Vec::with_capacity(self.registry.len());
        for state in self.dispatch_order() {
            if !pending.insert(state.address.clone()) {
                tracing::warn!(round, address = %state.address, "Duplicate job in round, skipping");
                continue;
            }
            sent.push(state.address.clone());
            if self.pool.submit(ProbeJob::from_state(round, &state)).is_err() {
                self.phase = RoundPhase::Idle;
                return Err(EngineError::PoolExhausted);
            }
        }
        let dispatched = pending.len();
        tracing::debug!(round, hosts = dispatched, "Round dispatched");

        // AWAITING_RESULTS
        self.phase = RoundPhase::AwaitingResults;
        let deadline = time::sleep(self.round_timeout);
        tokio::pin!(deadline);

        let mut results: Vec<ProbeResult> = Vec::with_capacity(dispatched);
        let mut discarded = 0;
        let mut timed_out = false;

        while !pending.is_empty() {
            tokio::select! {
                received = self.pool.next_result() => {
                    let Some(result) = received else {
                        self.phase = RoundPhase::Idle;
                        return Err(EngineError::PoolExhausted);
                    };
                    if result.round != round {
                        tracing::debug!(round, stale_round = result.round, address = %result.address, "Discarding late result");
                        discarded += 1;
                        continue;
                    }
                    if !pending.remove(&result.address) {
                        tracing::warn!(round, address = %result.address, "Unexpected result, dropping");
                        discarded += 1;
                        continue;
                    }
                    results.push(result);
                }
                _ = &mut deadline => {
                    timed_out = true;
                    self.pool.cancel_through(round);
                    let mut missing: Vec<&String> = pending.iter().collect();
                    missing.sort();
                    tracing::warn!(
                        round,
                        missing = pending.len(),
                        hosts = ?missing,
                        timeout_secs = self.round_timeout.as_secs(),
                        "Round grace period elapsed, applying partial results"
                    );
                    break;
                }
                _ = &mut cancel => {
                    self.pool.cancel_through(round);
                    tracing::info!(round, outstanding = pending.len(), "Round abandoned");
                    self.phase = RoundPhase::Idle;
                    return Ok(None);
                }
            }
        }

        // APPLYING
        self.phase = RoundPhase::Applying;
        let applied = results.len();
        let mut transitions = 0;
        for result in results {
            if self.apply_result(round, result) {
                transitions += 1;
            }
        }

        let missing = pending.len();
        self.overdue = sent.into_iter().filter(|a| pending.contains(a)).collect();

        let report = RoundReport {
            round,
            dispatched,
            applied,
            missing,
            discarded,
            transitions,
            duration: started.elapsed(),
            timed_out,
        };

        let (up, down) = self.registry.counts();
        metrics::record_round(report.duration, timed_out);
        metrics::record_host_counts(up, down);
        if let Some(board) = &self.board {
            board.publish(report.clone(), self.registry.snapshot());
        }

        tracing::info!(
            round,
            hosts = dispatched,
            up,
            down,
            transitions,
            duration_ms = report.duration.as_millis() as u64,
            "Round complete"
        );

        self.phase = RoundPhase::Idle;
        Ok(Some(report))
    }

    /// Registry snapshot with last round's overdue hosts moved to the front.
    fn dispatch_order(&self) -> Vec<HostState> {
        let overdue: HashSet<&str> = self.overdue.iter().map(String::as_str).collect();
        let mut order: Vec<HostState> = self
            .overdue
            .iter()
            .filter_map(|address| self.registry.get(address).cloned())
            .collect();
        order.extend(
            self.registry
                .snapshot()
                .into_iter()
                .filter(|s| !overdue.contains(s.address.as_str())),
        );
        order
    }

    /// Evaluate one result against the registry. Returns true on transition.
    fn apply_result(&mut self, round: u64, result: ProbeResult) -> bool {
        let Some(prior) = self.registry.get(&result.address).cloned() else {
            tracing::warn!(round, address = %result.address, "Result for unknown address, dropping");
            return false;
        };

        let (next, transitioned) = self.detector.evaluate(&prior, result.reachable, result.observed_at);

        if !transitioned {
            if result.reachable && prior.fail_streak > 0 && prior.confirmed == LinkState::Up {
                tracing::debug!(address = %prior.address, fails = prior.fail_streak, "Fail streak reset");
            } else if !result.reachable && prior.confirmed == LinkState::Up {
                tracing::debug!(
                    address = %prior.address,
                    fails = next.fail_streak,
                    max_fails = self.detector.max_fails_count(),
                    "Host failing"
                );
            }
        }

        let transition = transitioned.then(|| Transition::new(round, &prior, &next));

        if let Err(e) = self.registry.apply(&result.address, next) {
            tracing::warn!(round, error = %e, "Registry rejected update");
            return false;
        }

        match transition {
            Some(transition) => {
                metrics::record_transition(transition.to);
                self.notifier.emit(transition);
                true
            }
            None => false,
        }
    }
}
