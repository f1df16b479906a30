//! Data models for airport status extraction and alert composition.
//!
//! This module defines the transient records produced during a single run:
//! - [`DelayProgram`]: One delay or ground stop program found in the realtime feed
//! - [`PlanningMatch`]: One advisory line from the planning page mentioning a target
//! - [`TriggerKind`] / [`FallbackKind`]: How the run was started and which banner
//!   to send when nothing is wrong
//! - [`AlertMessage`]: The composed text handed to the notifier
//!
//! Nothing here is persisted; every value is rebuilt from the feeds on each run.

use std::fmt;

/// Reason text used when a program does not carry one.
pub const DEFAULT_REASON: &str = "Unknown";
/// Average delay text used when a program does not carry one.
pub const DEFAULT_AVG_DELAY: &str = "N/A";
/// Category used when a delay-type group has no `Name` child.
pub const DEFAULT_CATEGORY: &str = "Delay";

/// A delay program extracted from the realtime status feed.
///
/// # Fields
///
/// * `airport` - The airport code the program applies to (e.g. `"ASE"`)
/// * `reason` - Free-text cause reported by the feed, or [`DEFAULT_REASON`]
/// * `average_delay` - Average delay as reported (e.g. `"45 minutes"`), or [`DEFAULT_AVG_DELAY`]
/// * `category` - Display name of the enclosing delay-type group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayProgram {
    pub airport: String,
    pub reason: String,
    pub average_delay: String,
    pub category: String,
}

impl DelayProgram {
    /// Render the program as the Markdown block used in the "Active Now" section.
    pub fn to_alert_line(&self) -> String {
        format!(
            "**{}** at {}\nReason: {}\nAvg Delay: {}",
            self.category, self.airport, self.reason, self.average_delay
        )
    }
}

/// A line from the planning page that mentions a target airport alongside a
/// delay keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningMatch {
    /// The target airport whose code occurred in the line.
    pub airport: String,
    /// The uppercased line with table-cell tags and `&NBSP;` removed, trimmed.
    pub line: String,
}

impl PlanningMatch {
    pub fn to_alert_line(&self) -> String {
        format!("{}: {}", self.airport, self.line)
    }
}

/// How the current invocation was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerKind {
    /// Started by the external scheduler.
    #[default]
    Scheduled,
    /// Started by a person, who expects an answer even when all is clear.
    Manual,
}

impl TriggerKind {
    /// Interpret the trigger signal passed in by the runner.
    ///
    /// `workflow_dispatch` (GitHub Actions) and `manual` are manual runs;
    /// anything else, including no signal at all, is a scheduled run.
    pub fn from_signal(signal: Option<&str>) -> Self {
        match signal.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "workflow_dispatch" || s == "manual" => TriggerKind::Manual,
            _ => TriggerKind::Scheduled,
        }
    }
}

/// Which "nothing to report" banner, if any, should be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackKind {
    /// Stay silent.
    None,
    /// A person asked; confirm that everything is clear.
    ManualCheck,
    /// The current time falls in a heartbeat window; the label names it
    /// (e.g. `"Daily"`).
    Heartbeat { label: String },
}

impl fmt::Display for FallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackKind::None => write!(f, "none"),
            FallbackKind::ManualCheck => write!(f, "manual_check"),
            FallbackKind::Heartbeat { label } => write!(f, "heartbeat({label})"),
        }
    }
}

/// The final message sent to the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertMessage {
    /// At least one delay or ground stop was found.
    Alert(String),
    /// Nothing found, but the run was started by hand.
    ManualCheck(String),
    /// Nothing found, but a heartbeat window is open.
    Heartbeat(String),
}

impl AlertMessage {
    /// The text to deliver.
    pub fn content(&self) -> &str {
        match self {
            AlertMessage::Alert(s) | AlertMessage::ManualCheck(s) | AlertMessage::Heartbeat(s) => s.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AlertMessage::Alert(_) => "alert",
            AlertMessage::ManualCheck(_) => "manual_check",
            AlertMessage::Heartbeat(_) => "heartbeat",
        }
    }
}
