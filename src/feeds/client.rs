//! HTTP access to the FAA feeds.
//!
//! [`FeedSource`] is the seam between the pipeline and the network: the
//! production implementation is [`FeedClient`], tests substitute in-memory
//! bodies.

use crate::config::AppConfig;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Why a feed could not be retrieved this cycle.
///
/// Callers treat every variant as "no data"; none of them abort the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Anything that can fetch a feed body by URL.
pub trait FeedSource {
    /// Fetch `url` and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`FeedSource`] backed by a `reqwest` client carrying the configured
/// user agent and request timeout.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }

    /// The underlying client, shared with webhook delivery so it carries the
    /// same user agent and timeout.
    pub fn http(&self) -> Client {
        self.client.clone()
    }
}

impl FeedSource for FeedClient {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Network { url: url.to_string(), source: e }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "Feed returned a non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Body { url: url.to_string(), source: e }
            }
        })?;

        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched feed"
        );
        debug!(preview = %truncate_for_log(&body, 300), "Feed body");
        Ok(body)
    }
}
