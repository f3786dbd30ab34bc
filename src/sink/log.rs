//! Logging sink.

use async_trait::async_trait;
use crate::health::{LinkState, Transition};
use crate::sink::{SinkError, TransitionSink};

/// Writes every transition to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl TransitionSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, transition: &Transition) -> Result<(), SinkError> {
        match transition.to {
            LinkState::Up => tracing::info!(
                address = %transition.address,
                round = transition.round,
                "{} up", transition.address
            ),
            LinkState::Down => tracing::warn!(
                address = %transition.address,
                round = transition.round,
                "{} down", transition.address
            ),
        }
        Ok(())
    }
}
