//! # faa_watch
//!
//! Polls the FAA airport status and operations-plan feeds for a configured
//! set of airports and posts a summary of active delays, ground stops, and
//! forecast advisories to a Discord-compatible webhook.
//!
//! ## Usage
//!
//! ```sh
//! DISCORD_WEBHOOK=https://discord.com/api/webhooks/... faa_watch -a ASE
//! ```
//!
//! ## Architecture
//!
//! Each invocation makes a single pass and exits:
//! 1. **Fetching**: GET the status feed, then the planning page
//! 2. **Extracting**: Find delay programs and advisory lines for the targets
//! 3. **Composing**: Build an alert, or a manual-check / heartbeat banner
//! 4. **Notifying**: POST the message, retrying once on failure
//!
//! Scheduling is external (cron, CI). The process exits with 0 after every
//! normal pass, 2 when both feeds were unreachable, and 1 when the
//! configuration is invalid.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod schedule;
mod utils;

use cli::Cli;
use config::AppConfig;
use feeds::client::FeedClient;
use models::TriggerKind;
use outputs::webhook::webhook_notifier;
use utils::now_in;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("faa_watch starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.airports, dry_run = args.dry_run, "Parsed CLI arguments");

    let config = match AppConfig::load(args.config.as_deref()).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(1);
        }
    };
    let config = match config.with_targets(&args.airports) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid --airport values");
            return ExitCode::from(1);
        }
    };
    let tz = match config.tz() {
        Ok(tz) => tz,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(1);
        }
    };

    let feeds = match FeedClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Could not build HTTP client");
            return ExitCode::from(1);
        }
    };
    let notifier = webhook_notifier(
        feeds.http(),
        args.webhook_url.as_deref(),
        config.delivery_retries,
        args.dry_run,
    );
    let trigger = TriggerKind::from_signal(args.trigger.as_deref());

    let report = pipeline::run_once(&config, &feeds, &notifier, trigger, now_in(tz)).await;

    let elapsed = start_time.elapsed();
    info!(
        realtime = report.realtime_count,
        planning = report.planning_count,
        fallback = %report.fallback,
        message = report.message_kind.unwrap_or("none"),
        outcome = ?report.outcome,
        elapsed_ms = elapsed.as_millis() as u64,
        "Execution complete"
    );

    if report.all_feeds_failed {
        warn!("Both FAA feeds were unreachable this run");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
