//! Webhook delivery with bounded retry.
//!
//! # Architecture
//!
//! - [`Deliver`]: Core trait for pushing one message somewhere
//! - [`WebhookClient`]: POSTs `{"content": ...}` to a Discord-compatible webhook
//! - [`RetryDeliver`]: Decorator that retries any [`Deliver`] with backoff
//! - [`Notifier`]: Front door used by the pipeline; a no-op when no
//!   destination is configured
//!
//! # Retry Strategy
//!
//! - A configurable number of extra attempts (one by default)
//! - Exponential backoff starting at 2 seconds, capped at 30 seconds
//! - Random jitter (0-250ms) added to each wait
//!
//! Delivery failure is logged and reported back, never raised: an alert that
//! cannot be sent must not abort the run.

use rand::{Rng, rng};
use reqwest::Client;
use serde::Serialize;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Something that can deliver a message.
pub trait Deliver {
    /// Deliver `content` once.
    async fn deliver(&self, content: &str) -> Result<(), Box<dyn Error>>;
}

/// Discord rejects `content` longer than this many characters.
pub const CONTENT_LIMIT: usize = 2000;
const TRUNCATION_MARKER: &str = "\n…(truncated)";

/// Clip `content` to [`CONTENT_LIMIT`] characters, marker included.
pub fn fit_content(content: &str) -> Cow<'_, str> {
    if content.chars().count() <= CONTENT_LIMIT {
        return Cow::Borrowed(content);
    }
    let keep = CONTENT_LIMIT - TRUNCATION_MARKER.chars().count();
    let mut clipped: String = content.chars().take(keep).collect();
    clipped.push_str(TRUNCATION_MARKER);
    Cow::Owned(clipped)
}

/// JSON body accepted by Discord webhooks.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts messages to a single webhook URL.
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

// The URL embeds the webhook token; keep it out of logs.
impl fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookClient")
            .field("url", &"<redacted>")
            .finish()
    }
}

impl Deliver for WebhookClient {
    #[instrument(level = "info", skip_all)]
    async fn deliver(&self, content: &str) -> Result<(), Box<dyn Error>> {
        let t0 = Instant::now();
        let content = fit_content(content);
        if let Cow::Owned(_) = content {
            warn!(limit = CONTENT_LIMIT, "Message too long for webhook; truncating");
        }
        self.client
            .post(&self.url)
            .json(&WebhookPayload { content: &content })
            .send()
            .await?
            .error_for_status()?;
        info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Webhook accepted message");
        Ok(())
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Deliver`].
///
/// The delay before retry `n` (1-based) is:
/// ```text
/// delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryDeliver<T> {
    inner: T,
    /// Attempts made after the first failure.
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryDeliver<T>
where
    T: Deliver,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryDeliver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryDeliver")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Deliver for RetryDeliver<T>
where
    T: Deliver,
{
    #[instrument(level = "info", skip_all)]
    async fn deliver(&self, content: &str) -> Result<(), Box<dyn Error>> {
        let mut attempt = 0usize;

        loop {
            match self.inner.deliver(content).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(attempt, max = self.max_retries, error = %e, "deliver() exhausted retries");
                        return Err(e);
                    }

                    let delay = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1).min(16))
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(attempt, max = self.max_retries, ?delay, error = %e, "deliver() attempt failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}

/// What happened to a composed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Nothing was composed, so nothing was sent.
    Silent,
    /// No webhook is configured.
    Skipped,
    /// `--dry-run`: logged instead of sent.
    DryRun,
    Delivered,
    Failed,
}

/// Sends composed messages to the configured destination, if any.
#[derive(Debug)]
pub struct Notifier<D> {
    sink: Option<D>,
    dry_run: bool,
}

impl<D: Deliver> Notifier<D> {
    pub fn new(sink: Option<D>, dry_run: bool) -> Self {
        Self { sink, dry_run }
    }

    /// Deliver `content`; never fails.
    #[instrument(level = "info", skip_all)]
    pub async fn notify(&self, content: &str) -> NotifyOutcome {
        if self.dry_run {
            info!(message = %content, "Dry run; not sending");
            return NotifyOutcome::DryRun;
        }
        let Some(sink) = &self.sink else {
            info!("No webhook URL configured. Skipping notification.");
            return NotifyOutcome::Skipped;
        };
        match sink.deliver(content).await {
            Ok(()) => NotifyOutcome::Delivered,
            Err(e) => {
                error!(error = %e, "Failed to deliver notification");
                NotifyOutcome::Failed
            }
        }
    }
}

/// Build the production notifier for an optional webhook URL.
pub fn webhook_notifier(
    client: Client,
    url: Option<&str>,
    retries: usize,
    dry_run: bool,
) -> Notifier<RetryDeliver<WebhookClient>> {
    let sink = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(|u| RetryDeliver::new(WebhookClient::new(client, u), retries, StdDuration::from_secs(2)));
    Notifier::new(sink, dry_run)
}
