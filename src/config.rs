//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so running without a config file watches Aspen
//! (`ASE`) against the public FAA feeds. The loaded value is validated once at
//! startup and then passed by reference to each stage of the pipeline.
//!
//! # Example
//!
//! ```yaml
//! targets: [ASE, EGE]
//! timezone: America/Denver
//! heartbeat_windows:
//!   - label: Daily
//!     hour: 7
//!     minute_start: 0
//!     minute_end: 14
//! ```

use chrono_tz::Tz;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_STATUS_URL: &str = "https://nasstatus.faa.gov/api/airport-status-information";
pub const DEFAULT_PLANNING_URL: &str = "https://www.fly.faa.gov/adv/adv_spt.jsp";

/// A minute range within one hour of the local day during which a scheduled
/// run sends a heartbeat even when nothing is wrong.
///
/// Both ends of the minute range are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeartbeatWindow {
    /// Shown in the banner, e.g. `"Daily"` yields "Daily Heartbeat".
    #[serde(default = "default_window_label")]
    pub label: String,
    pub hour: u32,
    #[serde(default)]
    pub minute_start: u32,
    #[serde(default = "default_minute_end")]
    pub minute_end: u32,
}

impl HeartbeatWindow {
    pub fn contains(&self, hour: u32, minute: u32) -> bool {
        hour == self.hour && (self.minute_start..=self.minute_end).contains(&minute)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Airport codes to watch, in the order they should be reported.
    pub targets: Vec<String>,
    /// Realtime airport status feed (XML).
    pub status_url: String,
    /// Operations plan / advisory page (HTML).
    pub planning_url: String,
    /// Sent with every feed request; the FAA rejects anonymous clients.
    pub user_agent: String,
    /// IANA time zone used for heartbeat windows and the timestamp trailer.
    pub timezone: String,
    pub request_timeout_secs: u64,
    pub heartbeat_windows: Vec<HeartbeatWindow>,
    /// Child element names that hold program entries inside a `*_List`
    /// group, tried in order.
    pub program_fields: Vec<String>,
    /// Extra delivery attempts after the first failed webhook POST.
    pub delivery_retries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            targets: vec!["ASE".to_string()],
            status_url: DEFAULT_STATUS_URL.to_string(),
            planning_url: DEFAULT_PLANNING_URL.to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timezone: "America/Denver".to_string(),
            request_timeout_secs: 20,
            heartbeat_windows: vec![HeartbeatWindow {
                label: default_window_label(),
                hour: 7,
                minute_start: 0,
                minute_end: default_minute_end(),
            }],
            program_fields: vec![
                "Program".to_string(),
                "Ground_Delay".to_string(),
                "Arrival_Delay".to_string(),
            ],
            delivery_retries: 1,
        }
    }
}

fn default_window_label() -> String {
    "Daily".to_string()
}

fn default_minute_end() -> u32 {
    14
}

impl AppConfig {
    /// Load configuration from `path`, or use defaults when no path is given.
    ///
    /// The result is already validated and normalized (see [`AppConfig::validate`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// fails validation.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let config = match path {
            Some(p) => {
                let raw = fs::read_to_string(p).await?;
                let parsed = Self::from_yaml(&raw)?;
                info!(path = %p, "Loaded configuration file");
                parsed
            }
            None => {
                info!("No configuration file given; using defaults");
                Self::default()
            }
        };
        config.validate()
    }

    pub fn from_yaml(raw: &str) -> Result<Self, Box<dyn Error>> {
        // An empty file deserializes to unit, not to an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Normalize target codes and check every field that could otherwise
    /// fail halfway through a run.
    pub fn validate(mut self) -> Result<Self, Box<dyn Error>> {
        self.targets = normalize_targets(&self.targets);
        if self.targets.is_empty() {
            return Err("at least one target airport code is required".into());
        }

        self.tz()?;

        for url in [&self.status_url, &self.planning_url] {
            Url::parse(url).map_err(|e| format!("invalid feed URL {url:?}: {e}"))?;
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".into());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".into());
        }

        for w in &self.heartbeat_windows {
            if w.hour >= 24 || w.minute_end >= 60 || w.minute_start > w.minute_end {
                return Err(format!(
                    "invalid heartbeat window {:?}: need hour < 24 and minute_start <= minute_end < 60",
                    w
                )
                .into());
            }
        }

        self.program_fields.retain(|f| !f.trim().is_empty());
        if self.program_fields.is_empty() {
            return Err("program_fields must name at least one element".into());
        }

        Ok(self)
    }

    /// Replace the target set, e.g. from `--airport` flags.
    pub fn with_targets(mut self, targets: &[String]) -> Result<Self, Box<dyn Error>> {
        if !targets.is_empty() {
            self.targets = targets.to_vec();
        }
        self.validate()
    }

    pub fn tz(&self) -> Result<Tz, Box<dyn Error>> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid timezone {:?}: {e}", self.timezone).into())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Targets joined for display, e.g. `"ASE, EGE"`.
    pub fn targets_label(&self) -> String {
        self.targets.join(", ")
    }
}

/// Trim and uppercase codes, dropping blanks and repeats while keeping order.
fn normalize_targets(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for code in raw {
        let code = code.trim().to_ascii_uppercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}
