use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use reqwest::{header, StatusCode};
use serde::Serialize;
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::RelayConfig;

const BACKOFF_STEP: Duration = Duration::from_millis(200);

/// A downstream reply, kept as received so it can be replayed to the caller.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Retrying JSON POST client. Only transport errors and timeouts are retried;
/// any HTTP response, whatever its status, ends the attempt loop.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

/// Delay slept before retry `retry` (1-based). The first attempt is never delayed.
pub fn backoff_delay(retry: u32) -> Duration {
    BACKOFF_STEP * retry
}

impl Forwarder {
    pub fn new(timeout: Duration, max_retries: u32) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            timeout,
            max_retries,
        })
    }

    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        Self::new(config.webhook_timeout, config.webhook_retries)
    }

    pub async fn forward<T>(&self, url: &Url, payload: &T) -> anyhow::Result<DownstreamResponse>
    where
        T: Serialize + ?Sized,
    {
        let attempts = self.max_retries.saturating_add(1);
        let mut retry = 0;

        loop {
            match self.attempt(url, payload).await {
                Ok(response) => {
                    debug!(url = %url, status = %response.status, attempt = retry + 1, "Webhook responded");
                    return Ok(response);
                }
                Err(err) if retry < self.max_retries => {
                    warn!(url = %url, attempt = retry + 1, attempts, "Webhook POST failed: {:#}", err);
                    retry += 1;
                    sleep(backoff_delay(retry)).await;
                }
                Err(err) => {
                    warn!(url = %url, attempt = retry + 1, attempts, "Webhook POST failed: {:#}", err);
                    return Err(err.context(format!(
                        "POST to {} failed after {} attempt(s)",
                        url, attempts
                    )));
                }
            }
        }
    }

    async fn attempt<T>(&self, url: &Url, payload: &T) -> anyhow::Result<DownstreamResponse>
    where
        T: Serialize + ?Sized,
    {
        let resp = self
            .client
            .post(url.clone())
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .context("Failed to send webhook")?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .context("Failed to read webhook response body")?;

        Ok(DownstreamResponse {
            status,
            content_type,
            body,
        })
    }

    /// Runs [`Forwarder::forward`] on a detached task. The outcome is only logged.
    pub fn dispatch_detached<T>(&self, url: Url, payload: T) -> JoinHandle<()>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let forwarder = self.clone();
        tokio::spawn(async move {
            match forwarder.forward(&url, &payload).await {
                Ok(response) => {
                    info!(url = %url, status = %response.status, "Async webhook delivered")
                }
                Err(err) => error!(url = %url, "Async webhook failed: {:#}", err),
            }
        })
    }
}
