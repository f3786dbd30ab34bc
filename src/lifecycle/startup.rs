//! Startup orchestration.
//!
//! # Responsibilities
//! - Seed the registry and start every subsystem in dependency order
//! - Run the round scheduler until shutdown
//! - Drain the notifier before returning
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The status API binds before the first round so it never 404s on startup

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use crate::config::CheckerConfig;
use crate::health::{EngineError, HostRegistry, RoundScheduler, WorkerPool};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::probe::build_prober;
use crate::seed::{load_seed, SeedError};
use crate::sink::{build_sinks, Notifier, SinkError};
use crate::status::{self, StatusBoard, StatusState};

/// How long queued transitions may take to flush on exit.
const NOTIFIER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("seed failed: {0}")]
    Seed(#[from] SeedError),

    #[error("sink setup failed: {0}")]
    Sink(#[from] SinkError),

    #[error("cannot bind status API on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Run the checker until `shutdown` is triggered or the engine fails.
pub async fn run(config: CheckerConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let history = config.sinks.history_path.as_deref().map(Path::new);
    let seed = load_seed(&config.seed, history)?;
    let registry = HostRegistry::seed(seed.into_iter().map(|e| (e.address, e.state)));
    let board = Arc::new(StatusBoard::new(registry.snapshot()));

    let sinks = build_sinks(&config.sinks)?;
    let (notifier, notifier_task) = Notifier::spawn(sinks);

    let status_task = if config.status.enabled {
        let listener = TcpListener::bind(&config.status.bind_address)
            .await
            .map_err(|source| StartupError::Bind {
                address: config.status.bind_address.clone(),
                source,
            })?;
        let state = StatusState::new(board.clone(), config.status.api_key.clone());
        Some(tokio::spawn(status::serve(listener, state, shutdown.subscribe())))
    } else {
        None
    };

    let pool = WorkerPool::start(
        config.engine.worker_pool_size,
        build_prober(&config.probe),
        config.probe.timeout(),
    );
    let scheduler = RoundScheduler::new(registry, pool, notifier, &config.engine)
        .with_status_board(board);

    let outcome = scheduler.run(shutdown.subscribe()).await;

    // The engine may have stopped on its own; make sure everything else does too.
    shutdown.trigger();

    if let Some(task) = status_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Status API failed"),
            Err(e) => tracing::error!(error = %e, "Status API task panicked"),
        }
    }

    if tokio::time::timeout(NOTIFIER_DRAIN_TIMEOUT, notifier_task).await.is_err() {
        tracing::warn!("Transition notifier did not drain in time, pending notifications lost");
    }

    outcome.map_err(StartupError::from)
}
