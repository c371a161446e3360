//! Wall-clock helpers: HH:MM parsing and time-of-day windows.
//!
//! Schedule windows are local times of day and may wrap midnight
//! (e.g. 22:00-06:00). All containment and distance math lives here so the
//! scheduler and the night-setback logic share one definition of "wrap".

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Parse a local `HH:MM` string.
pub fn parse_hhmm(s: &str) -> CoreResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| CoreError::InvalidTime {
        what: format!("expected HH:MM, got '{s}'"),
    })
}

/// Minutes since midnight for a time of day.
pub fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// A time-of-day span, possibly wrapping midnight.
///
/// `start == end` denotes an empty span, not a full day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeSpan {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether the span wraps past midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Whether `t` falls inside the span. Start inclusive, end exclusive.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.wraps_midnight() {
            t >= self.start || t < self.end
        } else {
            t >= self.start && t < self.end
        }
    }

    /// Forward distance in minutes from `now` to the span start.
    ///
    /// Returns 0 if `now` is exactly the start; wraps into the next day when
    /// the start has already passed today.
    pub fn minutes_until_start(&self, now: NaiveTime) -> u32 {
        let now_m = minute_of_day(now) as i64;
        let start_m = minute_of_day(self.start) as i64;
        ((start_m - now_m).rem_euclid(24 * 60)) as u32
    }
}

/// Serde adapter storing a `NaiveTime` as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(de)?;
        super::parse_hhmm(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_accepts_hhmm_only() {
        assert_eq!(minute_of_day(t("06:30")), 390);
        assert!(parse_hhmm("6:3").is_ok()); // chrono tolerates single digits
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("nonsense").is_err());
    }

    #[test]
    fn plain_span_containment() {
        let span = TimeSpan::new(t("06:00"), t("08:30"));
        assert!(!span.contains(t("05:59")));
        assert!(span.contains(t("06:00")));
        assert!(span.contains(t("08:29")));
        assert!(!span.contains(t("08:30")));
    }

    #[test]
    fn wrapping_span_containment() {
        let span = TimeSpan::new(t("22:00"), t("06:00"));
        assert!(span.wraps_midnight());
        assert!(span.contains(t("23:00")));
        assert!(span.contains(t("00:00")));
        assert!(span.contains(t("05:59")));
        assert!(!span.contains(t("06:00")));
        assert!(!span.contains(t("12:00")));
    }

    #[test]
    fn minutes_until_start_wraps_forward() {
        let span = TimeSpan::new(t("09:00"), t("17:00"));
        assert_eq!(span.minutes_until_start(t("08:30")), 30);
        assert_eq!(span.minutes_until_start(t("09:00")), 0);
        // start already passed today: distance runs into tomorrow
        assert_eq!(span.minutes_until_start(t("10:00")), 23 * 60);
    }
}
