//! Webhook notification sink.
//!
//! # Design Decisions
//! - POST sends the full transition as JSON; GET sends `address` and `state`
//!   query parameters for receivers that only take simple URLs
//! - Network errors and 5xx are retried with jittered exponential backoff
//! - 4xx is final: the receiver understood and refused
//! - Receivers may see a transition more than once; `id` is stable across
//!   retries so they can deduplicate

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;
use crate::config::{WebhookConfig, WebhookMethod};
use crate::health::Transition;
use crate::resilience::backoff::calculate_backoff;
use crate::sink::{SinkError, TransitionSink};

pub struct WebhookSink {
    client: Client,
    url: Url,
    config: WebhookConfig,
}

impl WebhookSink {
    pub fn new(config: WebhookConfig) -> Result<Self, SinkError> {
        let url = Url::parse(&config.url).map_err(|e| SinkError::Config(e.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, url, config })
    }

    async fn send_once(&self, transition: &Transition) -> Result<StatusCode, reqwest::Error> {
        let request = match self.config.method {
            WebhookMethod::Post => self.client.post(self.url.clone()).json(transition),
            WebhookMethod::Get => self.client.get(self.url.clone()).query(&[
                ("address", transition.address.as_str()),
                ("state", transition.to.as_str()),
            ]),
        };
        let response = request
            .header("x-transition-id", transition.id.to_string())
            .send()
            .await?;
        Ok(response.status())
    }
}

#[async_trait]
impl TransitionSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, transition: &Transition) -> Result<(), SinkError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = self.send_once(transition).await;

            let retryable = match &outcome {
                Ok(status) if status.is_success() => return Ok(()),
                Ok(status) => status.is_server_error(),
                Err(_) => true,
            };

            if !retryable || attempt >= self.config.max_attempts {
                return match outcome {
                    Ok(status) => Err(SinkError::Rejected(status.as_u16())),
                    Err(e) => Err(SinkError::Http(e)),
                };
            }

            let delay = calculate_backoff(attempt, self.config.base_delay_ms, self.config.max_delay_ms);
            tracing::debug!(
                address = %transition.address,
                attempt,
                delay = ?delay,
                "Retrying webhook delivery"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
