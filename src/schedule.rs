//! Decide which "no issues" banner, if any, a run should send.
//!
//! A manual run always gets an answer. A scheduled run only speaks up when
//! nothing is wrong if the local time falls inside a configured heartbeat
//! window; otherwise it stays silent.

use crate::config::HeartbeatWindow;
use crate::models::{FallbackKind, TriggerKind};
use chrono::{DateTime, TimeZone, Timelike};
use tracing::debug;

/// Resolve the fallback for a run started by `trigger` at `now`.
///
/// `now` should already be in the configured local time zone: windows are
/// compared against its wall-clock hour and minute.
pub fn resolve_fallback<Tz: TimeZone>(
    trigger: TriggerKind,
    now: &DateTime<Tz>,
    windows: &[HeartbeatWindow],
) -> FallbackKind {
    if trigger == TriggerKind::Manual {
        return FallbackKind::ManualCheck;
    }

    let (hour, minute) = (now.hour(), now.minute());
    match windows.iter().find(|w| w.contains(hour, minute)) {
        Some(window) => {
            debug!(hour, minute, label = %window.label, "Inside heartbeat window");
            FallbackKind::Heartbeat {
                label: window.label.clone(),
            }
        }
        None => FallbackKind::None,
    }
}
