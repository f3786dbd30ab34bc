//! Transition delivery subsystem.
//!
//! # Data Flow
//! ```text
//! Round scheduler (APPLYING phase)
//!     → NotifierHandle::emit (non-blocking, unbounded queue)
//!     → notifier task, one transition at a time, in round order
//!     → every configured TransitionSink (log, history, webhook)
//! ```
//!
//! # Design Decisions
//! - Delivery is fire-and-forget from the scheduler's point of view
//! - A failing sink is logged and counted; other sinks still run
//! - Retries, if any, belong to the sink (see webhook.rs)
//! - Dropping every handle drains the queue, then the task exits

pub mod history;
pub mod log;
pub mod webhook;

use std::sync::Arc;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use crate::config::SinksConfig;
use crate::health::Transition;
use crate::observability::metrics;

pub use history::HistorySink;
pub use log::LogSink;
pub use webhook::WebhookSink;

/// Errors that can occur while delivering a transition.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Receiver rejected transition with status {0}")]
    Rejected(u16),

    #[error("Invalid sink configuration: {0}")]
    Config(String),
}

/// Receiver of confirmed transitions.
#[async_trait]
pub trait TransitionSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, transition: &Transition) -> Result<(), SinkError>;
}

/// Build the sinks enabled in the configuration.
pub fn build_sinks(config: &SinksConfig) -> Result<Vec<Arc<dyn TransitionSink>>, SinkError> {
    let mut sinks: Vec<Arc<dyn TransitionSink>> = Vec::new();
    if config.log {
        sinks.push(Arc::new(LogSink));
    }
    if let Some(path) = &config.history_path {
        sinks.push(Arc::new(HistorySink::new(path)));
    }
    if let Some(webhook) = &config.webhook {
        sinks.push(Arc::new(WebhookSink::new(webhook.clone())?));
    }
    Ok(sinks)
}

/// Sending side of the notifier queue, held by the round scheduler.
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    tx: mpsc::UnboundedSender<Transition>,
}

impl NotifierHandle {
    /// Queue a transition for delivery. Returns false if the notifier is gone.
    pub fn emit(&self, transition: Transition) -> bool {
        if self.tx.send(transition).is_err() {
            tracing::error!("Notifier task is gone, transition dropped");
            return false;
        }
        true
    }
}

/// Background delivery task.
pub struct Notifier {
    rx: mpsc::UnboundedReceiver<Transition>,
    sinks: Vec<Arc<dyn TransitionSink>>,
}

impl Notifier {
    /// Spawn the delivery task; it ends once every handle is dropped and the
    /// queue is drained.
    pub fn spawn(sinks: Vec<Arc<dyn TransitionSink>>) -> (NotifierHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        tracing::info!(sinks = ?names, "Transition notifier starting");

        let notifier = Self { rx, sinks };
        let task = tokio::spawn(notifier.run());
        (NotifierHandle { tx }, task)
    }

    async fn run(mut self) {
        while let Some(transition) = self.rx.recv().await {
            for sink in &self.sinks {
                if let Err(e) = sink.notify(&transition).await {
                    metrics::record_sink_failure(sink.name());
                    tracing::warn!(
                        sink = sink.name(),
                        address = %transition.address,
                        to = %transition.to,
                        error = %e,
                        "Transition delivery failed"
                    );
                }
            }
        }
        tracing::info!("Transition notifier drained");
    }
}
