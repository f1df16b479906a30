//! One pass of the watcher: fetch, extract, compose, notify.
//!
//! The feeds are checked one after the other. Each stage degrades to "nothing
//! to report" on failure, so a broken feed never prevents the other feed, the
//! fallback banners, or the notification from running.

use crate::config::AppConfig;
use crate::feeds::client::FeedSource;
use crate::feeds::{planning, realtime};
use crate::models::{DelayProgram, FallbackKind, PlanningMatch, TriggerKind};
use crate::outputs::message::compose;
use crate::outputs::webhook::{Deliver, Notifier, NotifyOutcome};
use crate::schedule::resolve_fallback;
use crate::utils::format_timestamp;
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{info, instrument};

/// Summary of a run, used for the final log line and the exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub realtime_count: usize,
    pub planning_count: usize,
    pub fallback: FallbackKind,
    /// Kind of the composed message, if one was composed.
    pub message_kind: Option<&'static str>,
    pub outcome: NotifyOutcome,
    /// Both feed fetches failed; nothing this run says can be trusted.
    pub all_feeds_failed: bool,
}

/// Run one check for `config.targets` as of `now`.
#[instrument(level = "info", skip_all, fields(targets = %config.targets_label(), ?trigger))]
pub async fn run_once<F, D>(
    config: &AppConfig,
    source: &F,
    notifier: &Notifier<D>,
    trigger: TriggerKind,
    now: DateTime<Tz>,
) -> RunReport
where
    F: FeedSource,
    D: Deliver,
{
    info!("Checking status for {}...", config.targets_label());

    let realtime = realtime::check(source, config).await;
    let planning = planning::check(source, config).await;
    let all_feeds_failed = realtime.is_none() && planning.is_none();

    let realtime_lines: Vec<String> = realtime
        .unwrap_or_default()
        .iter()
        .map(DelayProgram::to_alert_line)
        .collect();
    let planning_lines: Vec<String> = planning
        .unwrap_or_default()
        .iter()
        .map(PlanningMatch::to_alert_line)
        .collect();

    let fallback = resolve_fallback(trigger, &now, &config.heartbeat_windows);
    let message = compose(
        &realtime_lines,
        &planning_lines,
        &fallback,
        &config.targets_label(),
        &format_timestamp(&now),
    );

    let outcome = match &message {
        Some(msg) => {
            info!(kind = msg.kind(), "Sending notification");
            notifier.notify(msg.content()).await
        }
        None => {
            info!("No issues found. All clear.");
            NotifyOutcome::Silent
        }
    };

    RunReport {
        realtime_count: realtime_lines.len(),
        planning_count: planning_lines.len(),
        fallback,
        message_kind: message.as_ref().map(|m| m.kind()),
        outcome,
        all_feeds_failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::client::FetchError;
    use crate::outputs::webhook::tests::RecordingSink;
    use chrono::TimeZone;
    use chrono_tz::America::Denver;
    use std::cell::Cell;

    const GROUND_DELAY_ASE: &str = "<AIRPORT_STATUS_INFORMATION><Delay_type>\
        <Name>Ground Delay Programs</Name><Ground_Delay_List><Ground_Delay>\
        <ARPT>ASE</ARPT><Reason>Weather</Reason><Avg>45 minutes</Avg>\
        </Ground_Delay></Ground_Delay_List></Delay_type></AIRPORT_STATUS_INFORMATION>";
    const NO_DELAYS: &str =
        "<AIRPORT_STATUS_INFORMATION><Update_Time>now</Update_Time></AIRPORT_STATUS_INFORMATION>";
    const QUIET_PLAN: &str = "<TABLE><TR><TD>DEN DELAYS POSSIBLE AFTER 2200Z</TD></TR></TABLE>";

    /// Serves fixed bodies by URL; `None` simulates a failed fetch.
    struct StaticFeeds {
        status: Option<&'static str>,
        planning: Option<&'static str>,
        fetches: Cell<usize>,
    }

    impl StaticFeeds {
        fn new(status: Option<&'static str>, planning: Option<&'static str>) -> Self {
            Self {
                status,
                planning,
                fetches: Cell::new(0),
            }
        }
    }

    impl FeedSource for StaticFeeds {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.fetches.set(self.fetches.get() + 1);
            let config = AppConfig::default();
            let body = if url == config.status_url {
                self.status
            } else if url == config.planning_url {
                self.planning
            } else {
                None
            };
            body.map(str::to_string).ok_or(FetchError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Tz> {
        Denver.with_ymd_and_hms(2026, 10, 16, hour, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn test_active_ground_delay_is_sent() {
        let config = AppConfig::default();
        let feeds = StaticFeeds::new(Some(GROUND_DELAY_ASE), Some(QUIET_PLAN));
        let sink = RecordingSink::default();
        let notifier = Notifier::new(Some(&sink), false);

        let report = run_once(&config, &feeds, &notifier, TriggerKind::Scheduled, at(13, 0)).await;

        assert_eq!(report.realtime_count, 1);
        assert_eq!(report.planning_count, 0);
        assert_eq!(report.outcome, NotifyOutcome::Delivered);
        assert_eq!(feeds.fetches.get(), 2);
        let sent = sink.delivered.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("**FAA Alert for ASE**"));
        assert!(sent[0].contains("at ASE\nReason: Weather\nAvg Delay: 45 minutes"));
        assert!(sent[0].ends_with("*Checked at 2026-10-16 13:00:00 MDT*"));
    }

    #[tokio::test]
    async fn test_heartbeat_sent_once_in_window() {
        let config = AppConfig::default();
        let feeds = StaticFeeds::new(Some(NO_DELAYS), Some(QUIET_PLAN));
        let sink = RecordingSink::default();
        let notifier = Notifier::new(Some(&sink), false);

        let report = run_once(&config, &feeds, &notifier, TriggerKind::Scheduled, at(7, 5)).await;

        assert_eq!(report.message_kind, Some("heartbeat"));
        assert_eq!(report.outcome, NotifyOutcome::Delivered);
        assert_eq!(sink.attempts.get(), 1);
        let sent = sink.delivered.borrow();
        assert!(sent[0].contains("Daily Heartbeat"));
        assert!(sent[0].contains("Online"));
    }

    #[tokio::test]
    async fn test_scheduled_all_clear_outside_window_is_silent() {
        let config = AppConfig::default();
        let feeds = StaticFeeds::new(Some(NO_DELAYS), Some(QUIET_PLAN));
        let sink = RecordingSink::default();
        let notifier = Notifier::new(Some(&sink), false);

        let report = run_once(&config, &feeds, &notifier, TriggerKind::Scheduled, at(9, 30)).await;

        assert_eq!(report.fallback, FallbackKind::None);
        assert_eq!(report.message_kind, None);
        assert_eq!(report.outcome, NotifyOutcome::Silent);
        assert_eq!(sink.attempts.get(), 0);
    }

    #[tokio::test]
    async fn test_missing_webhook_skips_delivery() {
        let config = AppConfig::default();
        let feeds = StaticFeeds::new(Some(GROUND_DELAY_ASE), None);
        let notifier: Notifier<&RecordingSink> = Notifier::new(None, false);

        let report = run_once(&config, &feeds, &notifier, TriggerKind::Scheduled, at(13, 0)).await;

        assert_eq!(report.message_kind, Some("alert"));
        assert_eq!(report.outcome, NotifyOutcome::Skipped);
        assert!(!report.all_feeds_failed);
    }

    #[tokio::test]
    async fn test_failed_feeds_still_allow_manual_check() {
        let config = AppConfig::default();
        let feeds = StaticFeeds::new(None, None);
        let sink = RecordingSink::default();
        let notifier = Notifier::new(Some(&sink), false);

        let report = run_once(&config, &feeds, &notifier, TriggerKind::Manual, at(13, 0)).await;

        assert!(report.all_feeds_failed);
        assert_eq!(report.message_kind, Some("manual_check"));
        assert_eq!(report.outcome, NotifyOutcome::Delivered);
        assert!(sink.delivered.borrow()[0].contains("All clear for ASE"));
    }

    #[tokio::test]
    async fn test_planning_match_alone_triggers_alert() {
        let config = AppConfig::default();
        let feeds = StaticFeeds::new(Some("not xml at all"), Some("<TD>ASE GROUND STOP IN EFFECT</TD>"));
        let sink = RecordingSink::default();
        let notifier = Notifier::new(Some(&sink), false);

        let report = run_once(&config, &feeds, &notifier, TriggerKind::Scheduled, at(13, 0)).await;

        assert_eq!(report.realtime_count, 0);
        assert_eq!(report.planning_count, 1);
        let sent = sink.delivered.borrow();
        assert!(sent[0].contains("**Forecasted / Planning:**\nASE: ASE GROUND STOP IN EFFECT"));
        assert!(!sent[0].contains("Active Now"));
    }
}
