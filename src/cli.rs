//! Command-line interface definitions for faa_watch.
//!
//! All arguments can be provided via command-line flags or environment
//! variables, so the binary can run unchanged from cron or a CI scheduler.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Watch the default airport (ASE); notify if DISCORD_WEBHOOK is set
/// faa_watch
///
/// # Watch two airports and print instead of posting
/// faa_watch --airport ASE --airport EGE --dry-run
///
/// # Answer even when all is clear
/// faa_watch --trigger manual
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "FAA_WATCH_CONFIG")]
    pub config: Option<String>,

    /// Webhook to post alerts to; without it nothing is sent
    #[arg(long, env = "DISCORD_WEBHOOK", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// How this run was started: `workflow_dispatch`/`manual` count as manual,
    /// anything else as scheduled
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub trigger: Option<String>,

    /// Airport code to watch (repeatable); overrides the config file
    #[arg(short, long = "airport", value_name = "CODE")]
    pub airports: Vec<String>,

    /// Compose and log the message without posting it
    #[arg(long)]
    pub dry_run: bool,
}
