//! Effective-target resolution.
//!
//! Composed fresh every control tick from the zone's base target and the
//! engine-level adjustments. The order is significant: occupancy and outdoor
//! adjustments apply after the night setback, and the frost floor comes last
//! so nothing can push a zone below frost protection.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use wf_core::{round_half_degree, TimeSpan};
use wf_zone::Zone;

/// Night setback and occupancy adjustment tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub night_setback_enabled: bool,
    /// Window during which targets are clamped down to eco (may wrap).
    pub night_setback: TimeSpan,
    /// Minutes of vacancy after which the unoccupied setback applies.
    pub unoccupied_after_min: f64,
    /// Target reduction while unoccupied (°C).
    pub unoccupied_setback_c: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            night_setback_enabled: true,
            // ends before any plausible quick-heat lead on a morning
            // comfort window, so the clamp and pre-heat never fight
            night_setback: TimeSpan::new(
                NaiveTime::from_hms_opt(23, 0, 0).expect("valid time"),
                NaiveTime::from_hms_opt(5, 0, 0).expect("valid time"),
            ),
            unoccupied_after_min: 30.0,
            unoccupied_setback_c: 2.0,
        }
    }
}

/// Inputs gathered by the engine for one resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetInputs {
    pub unoccupied_minutes: f64,
    /// Heating-curve adjustment from outdoor temperature (°C, signed).
    pub weather_adjust_c: f64,
    pub summer_shutdown: bool,
    /// Hard frost outdoors: hold slightly above the frost floor.
    pub hard_frost: bool,
}

/// Resolve the temperature the controller should chase right now.
pub fn effective_target(
    zone: &Zone,
    time: NaiveTime,
    inputs: &TargetInputs,
    config: &TargetConfig,
) -> f64 {
    // Summer shutdown reduces every zone to frost protection; none of the
    // comfort adjustments apply to a paused system.
    let mut target = if inputs.summer_shutdown {
        zone.frost_temp
    } else {
        let mut t = zone.target_temp;
        if config.night_setback_enabled && config.night_setback.contains(time) {
            t = t.min(zone.eco_temp);
        }
        if inputs.unoccupied_minutes > config.unoccupied_after_min {
            t -= config.unoccupied_setback_c;
        }
        t + inputs.weather_adjust_c
    };

    let frost_floor = if inputs.hard_frost {
        zone.frost_temp + 1.0
    } else {
        zone.frost_temp
    };
    target = target.max(frost_floor);

    round_half_degree(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::parse_hhmm;
    use wf_zone::{FloorMaterial, HeatingTech, OperatingMode, ZoneSpec};

    fn zone() -> Zone {
        let mut z = Zone::new(ZoneSpec {
            name: "z".to_string(),
            tech: HeatingTech::Water,
            material: FloorMaterial::Tile,
            comfort_temp: 22.0,
            eco_temp: 18.0,
            frost_temp: 7.0,
            max_floor_temp: None,
            area_m2: 12.0,
            power_w: 1200.0,
            thermal_mass: 0.8,
            response_time_s: 1800.0,
        })
        .unwrap();
        z.set_mode(OperatingMode::Comfort);
        z
    }

    fn t(s: &str) -> NaiveTime {
        parse_hhmm(s).unwrap()
    }

    #[test]
    fn daytime_comfort_is_the_base_target() {
        let target = effective_target(
            &zone(),
            t("12:00"),
            &TargetInputs::default(),
            &TargetConfig::default(),
        );
        assert_eq!(target, 22.0);
    }

    #[test]
    fn night_setback_clamps_to_eco() {
        let target = effective_target(
            &zone(),
            t("23:30"),
            &TargetInputs::default(),
            &TargetConfig::default(),
        );
        assert_eq!(target, 18.0);
        // wraps past midnight
        let target = effective_target(
            &zone(),
            t("04:30"),
            &TargetInputs::default(),
            &TargetConfig::default(),
        );
        assert_eq!(target, 18.0);
    }

    #[test]
    fn vacancy_reduces_after_threshold() {
        let inputs = TargetInputs {
            unoccupied_minutes: 45.0,
            ..Default::default()
        };
        let target = effective_target(&zone(), t("12:00"), &inputs, &TargetConfig::default());
        assert_eq!(target, 20.0);

        let inputs = TargetInputs {
            unoccupied_minutes: 20.0,
            ..Default::default()
        };
        let target = effective_target(&zone(), t("12:00"), &inputs, &TargetConfig::default());
        assert_eq!(target, 22.0);
    }

    #[test]
    fn weather_adjustment_applies_after_setbacks() {
        let inputs = TargetInputs {
            unoccupied_minutes: 45.0,
            weather_adjust_c: 1.5,
            ..Default::default()
        };
        // 22 - 2 + 1.5 = 21.5
        let target = effective_target(&zone(), t("12:00"), &inputs, &TargetConfig::default());
        assert_eq!(target, 21.5);
    }

    #[test]
    fn frost_floor_is_applied_last() {
        let mut z = zone();
        z.set_mode(OperatingMode::Frost);
        let inputs = TargetInputs {
            unoccupied_minutes: 600.0,
            weather_adjust_c: -1.5,
            ..Default::default()
        };
        // 7 - 2 - 1.5 would be 3.5; the frost floor wins
        let target = effective_target(&z, t("12:00"), &inputs, &TargetConfig::default());
        assert_eq!(target, 7.0);
    }

    #[test]
    fn summer_shutdown_overrides_everything_but_frost() {
        let inputs = TargetInputs {
            summer_shutdown: true,
            ..Default::default()
        };
        let target = effective_target(&zone(), t("12:00"), &inputs, &TargetConfig::default());
        assert_eq!(target, 7.0);

        let inputs = TargetInputs {
            summer_shutdown: true,
            hard_frost: true,
            ..Default::default()
        };
        let target = effective_target(&zone(), t("12:00"), &inputs, &TargetConfig::default());
        assert_eq!(target, 8.0);
    }

    #[test]
    fn result_is_half_degree_aligned() {
        let inputs = TargetInputs {
            weather_adjust_c: 0.3,
            ..Default::default()
        };
        let target = effective_target(&zone(), t("12:00"), &inputs, &TargetConfig::default());
        assert_eq!(target * 2.0, (target * 2.0).round());
    }
}
