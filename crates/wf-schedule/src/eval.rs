//! Schedule evaluation: window matching and quick-heat anticipation.

use chrono::{Datelike, NaiveDateTime, Timelike};

use wf_core::minute_of_day;
use wf_zone::OperatingMode;

use crate::schedule::ZoneSchedule;

/// What the scheduler decided for one zone at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleDecision {
    /// Mode selected by a matching window, if any.
    pub mode: Option<OperatingMode>,
    /// True when no window matched but an upcoming comfort window triggered
    /// anticipatory pre-heat.
    pub quick_heat: bool,
}

/// Evaluate a zone schedule at `now`.
///
/// Matching order:
/// 1. today's windows, first match wins (including wraps started today)
/// 2. yesterday's midnight-wrapping windows still covering this morning
/// 3. quick-heat: a comfort window (today or early tomorrow) starting within
///    `anticipatory_minutes` while the zone is not already in comfort
///
/// Pure function: evaluating twice at the same timestamp gives the same
/// decision, so the engine can re-run it without generating duplicate events.
pub fn evaluate(
    schedule: &ZoneSchedule,
    now: NaiveDateTime,
    current_mode: OperatingMode,
    anticipatory_minutes: u32,
) -> ScheduleDecision {
    if !schedule.active {
        return ScheduleDecision::default();
    }

    let time = now.time();
    let today = now.weekday();

    for window in schedule.windows_for(today) {
        if window.span.contains(time) {
            return ScheduleDecision {
                mode: Some(window.mode),
                quick_heat: false,
            };
        }
    }

    // A window listed yesterday that wraps midnight still governs until its
    // end this morning.
    let yesterday = today.pred();
    for window in schedule.windows_for(yesterday) {
        if window.span.wraps_midnight() && time < window.span.end {
            return ScheduleDecision {
                mode: Some(window.mode),
                quick_heat: false,
            };
        }
    }

    if schedule.quick_heat && current_mode != OperatingMode::Comfort {
        if upcoming_comfort_within(schedule, now, anticipatory_minutes) {
            return ScheduleDecision {
                mode: Some(OperatingMode::Comfort),
                quick_heat: true,
            };
        }
    }

    ScheduleDecision::default()
}

/// Does a comfort window open within `minutes` of `now`?
///
/// Looks at today's remaining windows and, near midnight, at tomorrow's.
fn upcoming_comfort_within(schedule: &ZoneSchedule, now: NaiveDateTime, minutes: u32) -> bool {
    let time = now.time();
    let now_m = minute_of_day(time);
    let to_midnight = 24 * 60 - now_m;

    for window in schedule.windows_for(now.weekday()) {
        if window.mode != OperatingMode::Comfort {
            continue;
        }
        let until = window.span.minutes_until_start(time);
        // Restrict to starts later today: a start "23 hours away" is
        // yesterday's window seen through the 24h wrap, not an upcoming one.
        if until > 0 && until <= minutes && until < to_midnight {
            return true;
        }
    }

    // Early-tomorrow windows reachable across midnight.
    if to_midnight <= minutes {
        let budget = minutes - to_midnight;
        for window in schedule.windows_for(now.weekday().succ()) {
            if window.mode == OperatingMode::Comfort
                && minute_of_day(window.span.start) <= budget
            {
                return true;
            }
        }
    }

    false
}
