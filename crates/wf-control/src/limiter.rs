//! Floor-protection limiter.
//!
//! Runs after the PID on every tick and enforces the floor-material limits.
//! Rule order matters: a hard over-temperature or a moisture fault forces the
//! output to zero and overrides rate limiting and derating. Clamping is never
//! an error to the caller; the outcome carries the actions taken so the
//! engine can emit events.

use serde::{Deserialize, Serialize};

use wf_zone::Zone;

/// What the limiter did to the proposed output this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimiterAction {
    /// Floor at or above the zone's maximum: output forced to zero.
    FloorLimit,
    /// Moisture flagged on the zone: output forced to zero.
    Moisture,
    /// Floor warming faster than the material allows: output capped.
    RateLimited,
    /// Headroom below the derating band: output linearly derated.
    Derated,
}

/// Result of one clamp pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterOutcome {
    /// Safe output in [0, 100] to commit to the actuator.
    pub output: f64,
    /// Actions applied, in the order they fired.
    pub actions: Vec<LimiterAction>,
}

/// Floor-protection limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorProtection {
    /// Output cap applied while the floor warms too fast (percent).
    pub rate_cap_percent: f64,
    /// Headroom in °C below the max floor temperature where linear
    /// derating begins.
    pub derate_band_c: f64,
}

impl Default for FloorProtection {
    fn default() -> Self {
        Self {
            rate_cap_percent: 30.0,
            derate_band_c: 2.0,
        }
    }
}

impl FloorProtection {
    /// Clamp a proposed output against the zone's floor limits.
    pub fn clamp(&self, zone: &Zone, raw_output: f64) -> LimiterOutcome {
        let mut output = raw_output.clamp(0.0, 100.0);
        let mut actions = Vec::new();

        // Hard limits first: these zero the output no matter what.
        if zone.floor_temp >= zone.max_floor_temp {
            tracing::warn!(
                zone = %zone.name,
                floor = zone.floor_temp,
                max = zone.max_floor_temp,
                "floor temperature limit reached, forcing output off"
            );
            return LimiterOutcome {
                output: 0.0,
                actions: vec![LimiterAction::FloorLimit],
            };
        }
        if zone.moisture {
            tracing::warn!(zone = %zone.name, "moisture flagged, forcing output off");
            return LimiterOutcome {
                output: 0.0,
                actions: vec![LimiterAction::Moisture],
            };
        }

        // Rate limiting: observed rise from the two most recent samples.
        let max_rate = zone.material.limits().max_rate_c_per_hour;
        if let Some(rate) = zone.history.floor_rise_rate_per_hour() {
            if rate > max_rate && output > self.rate_cap_percent {
                output = self.rate_cap_percent;
                actions.push(LimiterAction::RateLimited);
            }
        }

        // Linear derating as headroom shrinks.
        let headroom = zone.max_floor_temp - zone.floor_temp;
        if headroom < self.derate_band_c {
            output *= (headroom / self.derate_band_c).max(0.0);
            actions.push(LimiterAction::Derated);
        }

        LimiterOutcome { output, actions }
    }
}
