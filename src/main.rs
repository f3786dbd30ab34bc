//! ping-checker
//!
//! Probes a fixed set of hosts in rounds and reports each host's confirmed
//! up/down transitions.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────┐  snapshot   ┌────────────────┐  ProbeJob   ┌──────────────┐
//!   │ registry │────────────▶│ round scheduler│────────────▶│ worker pool  │──▶ ping / tcp
//!   │          │◀────────────│                │◀────────────│ (N workers)  │
//!   └──────────┘   apply     └───────┬────────┘ ProbeResult └──────────────┘
//!                                    │ flap detector
//!                                    ▼
//!                             ┌──────────────┐
//!                             │   notifier   │──▶ log / history / webhook
//!                             └──────────────┘
//! ```

use std::path::PathBuf;
use clap::Parser;

use ping_checker::config::{self, CheckerConfig, LogFormat};
use ping_checker::lifecycle::{self, signals, Shutdown};
use ping_checker::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "ping-checker")]
#[command(about = "Flap-damped host liveness monitor", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long, env = "PING_CHECKER_CONFIG")]
    config: Option<PathBuf>,

    /// File with one host per line.
    #[arg(long, env = "HOSTS_FILE")]
    hosts_file: Option<String>,

    /// JSON-lines transition history (read at startup, appended on change).
    #[arg(long, env = "HISTORY_PATH")]
    history: Option<String>,

    /// Consecutive failed probes before a host is reported down.
    #[arg(long, env = "ALLOWED_FAILS")]
    max_fails: Option<u32>,

    /// Number of concurrent probe workers.
    #[arg(long, env = "WORKERS_COUNT")]
    workers: Option<usize>,

    /// Pause between rounds in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log format: pretty or json.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Args {
    fn apply(self, config: &mut CheckerConfig) {
        if let Some(path) = self.hosts_file {
            config.seed.hosts_file = Some(path);
        }
        if let Some(path) = self.history {
            config.sinks.history_path = Some(path);
        }
        if let Some(max_fails) = self.max_fails {
            config.engine.max_fails_count = max_fails;
        }
        if let Some(workers) = self.workers {
            config.engine.worker_pool_size = workers;
        }
        if let Some(interval) = self.interval_ms {
            config.engine.round_interval_ms = interval;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::read_config(path)?,
        None => CheckerConfig::default(),
    };
    args.apply(&mut config);
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        max_fails = config.engine.max_fails_count,
        workers = config.engine.worker_pool_size,
        interval_ms = config.engine.round_interval_ms,
        probe = ?config.probe.method,
        recovery = ?config.engine.recovery,
        "ping-checker starting"
    );

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    lifecycle::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
