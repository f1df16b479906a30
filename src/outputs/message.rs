//! Alert message composition.
//!
//! # Layout
//!
//! ```text
//! ✈️ **FAA Alert for ASE**
//!
//! **Active Now:**
//! **Ground Delay Programs** at ASE
//! Reason: Weather
//! Avg Delay: 45 minutes
//!
//! **Forecasted / Planning:**
//! ASE: ASE GROUND STOP POSSIBLE AFTER 2300Z
//!
//! *Checked at 2026-10-16 07:05:00 MDT*
//! ```
//!
//! Either section is omitted when it has no lines.

use crate::models::{AlertMessage, FallbackKind};

/// Compose the message for one run.
///
/// # Arguments
///
/// * `realtime` - Rendered lines from the status feed
/// * `planning` - Rendered lines from the planning page
/// * `fallback` - Banner to use when both line lists are empty
/// * `targets` - Display label for the watched airports, e.g. `"ASE, EGE"`
/// * `timestamp` - Formatted check time for the trailer
///
/// # Returns
///
/// `None` only when there is nothing to report and `fallback` is
/// [`FallbackKind::None`]; the caller must then stay silent.
pub fn compose(
    realtime: &[String],
    planning: &[String],
    fallback: &FallbackKind,
    targets: &str,
    timestamp: &str,
) -> Option<AlertMessage> {
    if !realtime.is_empty() || !planning.is_empty() {
        let mut msg = format!("✈️ **FAA Alert for {targets}**\n");
        if !realtime.is_empty() {
            msg.push_str("\n**Active Now:**\n");
            msg.push_str(&realtime.join("\n"));
        }
        if !planning.is_empty() {
            msg.push_str("\n\n**Forecasted / Planning:**\n");
            msg.push_str(&planning.join("\n"));
        }
        msg.push_str(&format!("\n\n*Checked at {timestamp}*"));
        return Some(AlertMessage::Alert(msg));
    }

    match fallback {
        FallbackKind::ManualCheck => Some(AlertMessage::ManualCheck(format!(
            "✅ **Manual Check:** All clear for {targets}. No delays or ground stops reported.\n*Checked at {timestamp}*"
        ))),
        FallbackKind::Heartbeat { label } => Some(AlertMessage::Heartbeat(format!(
            "✅ **{label} Heartbeat:** FAA monitor for {targets} is Online. No delays reported.\n*Checked at {timestamp}*"
        ))),
        FallbackKind::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2026-10-16 07:05:00 MDT";

    fn heartbeat() -> FallbackKind {
        FallbackKind::Heartbeat {
            label: "Daily".to_string(),
        }
    }

    #[test]
    fn test_alert_with_both_sections() {
        let realtime = vec!["**Ground Stop Programs** at ASE\nReason: snow\nAvg Delay: N/A".to_string()];
        let planning = vec!["ASE: ASE GROUND STOP POSSIBLE".to_string()];
        let msg = compose(&realtime, &planning, &FallbackKind::None, "ASE", TS).unwrap();
        assert_eq!(
            msg.content(),
            "✈️ **FAA Alert for ASE**\n\
             \n**Active Now:**\n**Ground Stop Programs** at ASE\nReason: snow\nAvg Delay: N/A\
             \n\n**Forecasted / Planning:**\nASE: ASE GROUND STOP POSSIBLE\
             \n\n*Checked at 2026-10-16 07:05:00 MDT*"
        );
        assert_eq!(msg.kind(), "alert");
    }

    #[test]
    fn test_alert_sections_are_optional() {
        let planning = vec!["ASE: ASE DELAYS EXPECTED".to_string(), "EGE: EGE DELAYS EXPECTED".to_string()];
        let msg = compose(&[], &planning, &FallbackKind::None, "ASE, EGE", TS).unwrap();
        let text = msg.content();
        assert!(text.starts_with("✈️ **FAA Alert for ASE, EGE**\n"));
        assert!(!text.contains("Active Now"));
        assert!(text.contains("ASE: ASE DELAYS EXPECTED\nEGE: EGE DELAYS EXPECTED"));
        assert!(text.ends_with("*Checked at 2026-10-16 07:05:00 MDT*"));

        let realtime = vec!["line".to_string()];
        let msg = compose(&realtime, &[], &FallbackKind::None, "ASE", TS).unwrap();
        assert!(!msg.content().contains("Forecasted"));
    }

    #[test]
    fn test_issues_take_precedence_over_fallback() {
        let realtime = vec!["line".to_string()];
        for fallback in [FallbackKind::None, FallbackKind::ManualCheck, heartbeat()] {
            let msg = compose(&realtime, &[], &fallback, "ASE", TS).unwrap();
            assert!(matches!(msg, AlertMessage::Alert(_)));
        }
    }

    #[test]
    fn test_manual_check_banner() {
        let msg = compose(&[], &[], &FallbackKind::ManualCheck, "ASE", TS).unwrap();
        assert!(matches!(msg, AlertMessage::ManualCheck(_)));
        assert!(msg.content().contains("All clear for ASE"));
        assert!(msg.content().contains(TS));
    }

    #[test]
    fn test_heartbeat_banner() {
        let msg = compose(&[], &[], &heartbeat(), "ASE", TS).unwrap();
        assert!(matches!(msg, AlertMessage::Heartbeat(_)));
        assert!(msg.content().contains("Daily Heartbeat"));
        assert!(msg.content().contains("Online"));
    }

    #[test]
    fn test_silent_when_nothing_to_say() {
        assert_eq!(compose(&[], &[], &FallbackKind::None, "ASE", TS), None);
    }
}
