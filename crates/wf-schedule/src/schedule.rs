//! Schedule data types.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use wf_core::TimeSpan;
use wf_zone::OperatingMode;

/// One time window selecting an operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeWindow {
    #[serde(flatten)]
    pub span: TimeSpan,
    pub mode: OperatingMode,
}

/// Windows for one weekday, in priority order (first match wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: Weekday,
    #[serde(default)]
    pub windows: Vec<ModeWindow>,
}

/// The weekly schedule of one zone.
///
/// Days without windows mean "no scheduled change": the last-set mode
/// persists. Overlapping windows resolve to the first in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSchedule {
    /// Disabled schedules are never evaluated.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Whether anticipatory pre-heat before comfort windows is allowed.
    #[serde(default = "default_true")]
    pub quick_heat: bool,
    #[serde(default)]
    pub days: Vec<DaySchedule>,
}

fn default_true() -> bool {
    true
}

impl Default for ZoneSchedule {
    fn default() -> Self {
        Self {
            active: true,
            quick_heat: true,
            days: Vec::new(),
        }
    }
}

impl ZoneSchedule {
    /// Windows configured for a weekday, empty when the day is absent.
    pub fn windows_for(&self, day: Weekday) -> &[ModeWindow] {
        self.days
            .iter()
            .find(|d| d.day == day)
            .map_or(&[][..], |d| &d.windows)
    }
}
