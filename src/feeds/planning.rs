//! Operations plan (advisory page) scanning.
//!
//! The planning page is loosely structured HTML, so it is not parsed. The
//! whole body is uppercased and scanned line by line for a target airport code
//! appearing together with `GROUND STOP` or `DELAY`.
//!
//! # Matching
//!
//! Codes are matched as plain substrings, so `"LAX"` also matches inside any
//! longer token that contains those letters. That imprecision is accepted:
//! advisories rarely spell airports any other way, and a false positive costs
//! one extra line in an alert.

use crate::config::AppConfig;
use crate::feeds::client::FeedSource;
use crate::models::PlanningMatch;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info, instrument};

const KEYWORDS: [&str; 2] = ["GROUND STOP", "DELAY"];

/// Cleaned lines must be longer than this many characters to be reported.
const MIN_LINE_CHARS: usize = 10;

/// Table-cell tags (with or without attributes) and the non-breaking-space
/// entity, in their uppercased forms.
static NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?TD(?:\s[^>]*)?>|&NBSP;").expect("static regex"));

/// Fetch the planning page and scan it for the configured targets.
///
/// Returns `None` when the page could not be fetched.
#[instrument(level = "info", skip_all, fields(url = %config.planning_url))]
pub async fn check<F: FeedSource>(source: &F, config: &AppConfig) -> Option<Vec<PlanningMatch>> {
    match source.fetch(&config.planning_url).await {
        Ok(body) => {
            let matches = extract(&body, &config.targets);
            info!(count = matches.len(), "Planning lines matched");
            Some(matches)
        }
        Err(e) => {
            error!(error = %e, "Error checking future plans");
            None
        }
    }
}

/// Scan `body` and emit one match per (line, target) pair, in line order and
/// then target order.
pub fn extract(body: &str, targets: &[String]) -> Vec<PlanningMatch> {
    let text = body.to_uppercase();
    let mut matches = Vec::new();

    for line in text.lines() {
        if !KEYWORDS.iter().any(|k| line.contains(k)) {
            continue;
        }
        for airport in targets {
            if !line.contains(airport.as_str()) {
                continue;
            }
            let cleaned = clean_line(line);
            if cleaned.chars().count() <= MIN_LINE_CHARS {
                debug!(%airport, line = %cleaned, "Skipping short planning line");
                continue;
            }
            matches.push(PlanningMatch {
                airport: airport.clone(),
                line: cleaned,
            });
        }
    }
    matches
}

/// Strip markup noise from an uppercased line and trim it.
pub fn clean_line(line: &str) -> String {
    NOISE.replace_all(line, "").trim().to_string()
}
