//! Fixed-size probe worker pool.
//!
//! # Responsibilities
//! - Start N workers once, at construction
//! - Take `ProbeJob`s from a shared queue, probe, emit one `ProbeResult` each
//!
//! # Design Decisions
//! - Workers never see the registry, only the job snapshot
//! - Probe errors and timeouts become `reachable = false`
//! - Jobs from cancelled rounds are dropped unprobed, so a cut-short round
//!   leaves no backlog in front of the next one
//! - The result queue closes when the last worker exits, which the round
//!   scheduler treats as fatal

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use crate::health::types::{ProbeJob, ProbeResult};
use crate::observability::metrics;
use crate::probe::Prober;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool is closed")]
    Closed,
}

type JobQueue = Arc<Mutex<mpsc::UnboundedReceiver<ProbeJob>>>;

/// Bounded-parallelism prober.
pub struct WorkerPool {
    jobs: mpsc::UnboundedSender<ProbeJob>,
    results: mpsc::UnboundedReceiver<ProbeResult>,
    workers: Vec<JoinHandle<()>>,
    /// Lowest round whose jobs are still worth probing.
    live_round: Arc<AtomicU64>,
}

impl WorkerPool {
    /// Spawn `size` workers sharing `prober`.
    pub fn start(size: usize, prober: Arc<dyn Prober>, probe_timeout: Duration) -> Self {
        let size = size.max(1);
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let queue: JobQueue = Arc::new(Mutex::new(jobs_rx));
        let live_round = Arc::new(AtomicU64::new(0));

        let workers = (0..size)
            .map(|id| {
                let worker = Worker {
                    id,
                    queue: queue.clone(),
                    live_round: live_round.clone(),
                    results: results_tx.clone(),
                    prober: prober.clone(),
                    timeout: probe_timeout,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        tracing::info!(workers = size, prober = prober.name(), "Worker pool started");

        Self {
            jobs: jobs_tx,
            results: results_rx,
            workers,
            live_round,
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job. Never blocks; the queue is unbounded.
    pub fn submit(&self, job: ProbeJob) -> Result<(), PoolError> {
        self.jobs.send(job).map_err(|_| PoolError::Closed)
    }

    /// Drop every queued job of `round` and earlier. Probes already running
    /// finish and their results still arrive.
    pub fn cancel_through(&self, round: u64) {
        self.live_round.fetch_max(round.saturating_add(1), Ordering::SeqCst);
    }

    /// Next result from any worker. `None` once every worker has exited.
    pub async fn next_result(&mut self) -> Option<ProbeResult> {
        self.results.recv().await
    }

    /// Close the job queue and wait for idle workers; busy ones are aborted
    /// after `grace`.
    pub async fn shutdown(self, grace: Duration) {
        let WorkerPool { jobs, results, workers, .. } = self;
        drop(jobs);
        drop(results);

        for handle in workers {
            let abort = handle.abort_handle();
            if time::timeout(grace, handle).await.is_err() {
                abort.abort();
            }
        }
        tracing::info!("Worker pool stopped");
    }
}

struct Worker {
    id: usize,
    queue: JobQueue,
    live_round: Arc<AtomicU64>,
    results: mpsc::UnboundedSender<ProbeResult>,
    prober: Arc<dyn Prober>,
    timeout: Duration,
}

impl Worker {
    async fn run(self) {
        loop {
            let job = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };
            let Some(job) = job else {
                break;
            };
            if job.round < self.live_round.load(Ordering::SeqCst) {
                tracing::debug!(worker = self.id, round = job.round, address = %job.address, "Skipping job from cancelled round");
                continue;
            }

            let reachable = self.probe(&job.address).await;
            metrics::record_probe(reachable);

            let result = ProbeResult {
                round: job.round,
                address: job.address,
                reachable,
                observed_at: SystemTime::now(),
            };
            if self.results.send(result).is_err() {
                break;
            }
        }
        tracing::debug!(worker = self.id, "Worker exiting");
    }

    async fn probe(&self, address: &str) -> bool {
        // The outer deadline leaves the prober room to honour its own timeout.
        let deadline = self.timeout + Duration::from_millis(500);
        match time::timeout(deadline, self.prober.probe(address, self.timeout)).await {
            Ok(Ok(reachable)) => reachable,
            Ok(Err(e)) => {
                tracing::warn!(worker = self.id, address = %address, error = %e, "Probe failed, counting as unreachable");
                false
            }
            Err(_) => {
                tracing::warn!(worker = self.id, address = %address, "Probe exceeded deadline, counting as unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use crate::health::types::LinkState;
    use crate::probe::ProbeError;

    /// Reachable iff the address ends in an even digit; "err" fails.
    struct ParityProber {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ParityProber {
        fn new() -> Self {
            Self { in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Prober for ParityProber {
        fn name(&self) -> &'static str {
            "parity"
        }

        async fn probe(&self, address: &str, _timeout: Duration) -> Result<bool, ProbeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if address == "err" {
                return Err(ProbeError::Resolve(address.to_string()));
            }
            let last = address.chars().last().and_then(|c| c.to_digit(10)).unwrap_or(1);
            Ok(last % 2 == 0)
        }
    }

    struct HangingProber;

    #[async_trait]
    impl Prober for HangingProber {
        fn name(&self) -> &'static str {
            "hang"
        }

        async fn probe(&self, _address: &str, _timeout: Duration) -> Result<bool, ProbeError> {
            std::future::pending().await
        }
    }

    fn job(round: u64, address: &str) -> ProbeJob {
        ProbeJob {
            round,
            address: address.to_string(),
            fail_streak: 0,
            confirmed: LinkState::Up,
        }
    }

    #[tokio::test]
    async fn test_one_result_per_job_with_bounded_parallelism() {
        let prober = Arc::new(ParityProber::new());
        let mut pool = WorkerPool::start(3, prober.clone(), Duration::from_secs(1));
        assert_eq!(pool.size(), 3);

        let addresses: Vec<String> = (0..12).map(|i| format!("10.0.0.{}", i)).collect();
        for address in &addresses {
            pool.submit(job(1, address)).unwrap();
        }

        let mut seen = HashSet::new();
        for _ in 0..addresses.len() {
            let result = pool.next_result().await.unwrap();
            assert_eq!(result.round, 1);
            let expected = result.address.ends_with(&['0', '2', '4', '6', '8'][..]);
            assert_eq!(result.reachable, expected);
            assert!(seen.insert(result.address));
        }
        assert_eq!(seen.len(), addresses.len());
        assert!(prober.peak.load(Ordering::SeqCst) <= 3);

        pool.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_probe_error_is_unreachable() {
        let mut pool = WorkerPool::start(1, Arc::new(ParityProber::new()), Duration::from_secs(1));
        pool.submit(job(1, "err")).unwrap();

        let result = pool.next_result().await.unwrap();
        assert_eq!(result.address, "err");
        assert!(!result.reachable);

        pool.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_cancelled_rounds_are_not_probed() {
        let prober = Arc::new(ParityProber::new());
        let mut pool = WorkerPool::start(1, prober.clone(), Duration::from_secs(1));

        pool.cancel_through(1);
        pool.submit(job(1, "10.0.0.2")).unwrap();
        pool.submit(job(1, "10.0.0.4")).unwrap();
        pool.submit(job(2, "10.0.0.6")).unwrap();

        let result = pool.next_result().await.unwrap();
        assert_eq!(result.round, 2);
        assert_eq!(result.address, "10.0.0.6");
        assert!(time::timeout(Duration::from_millis(100), pool.next_result()).await.is_err());
        assert_eq!(prober.peak.load(Ordering::SeqCst), 1);

        pool.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_hanging_prober_is_cut_off() {
        let mut pool = WorkerPool::start(1, Arc::new(HangingProber), Duration::from_millis(50));
        pool.submit(job(4, "10.0.0.1")).unwrap();

        let result = time::timeout(Duration::from_secs(2), pool.next_result())
            .await
            .unwrap()
            .unwrap();
        assert!(!result.reachable);
        assert_eq!(result.round, 4);

        pool.shutdown(Duration::from_millis(10)).await;
    }
}
