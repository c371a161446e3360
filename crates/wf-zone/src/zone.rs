//! The zone model: one independently controlled heating circuit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ZoneError, ZoneResult};
use crate::history::{ZoneHistory, ZoneSample};
use crate::material::FloorMaterial;
use wf_core::ensure_finite;

/// Heat delivery technology of a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatingTech {
    Electric,
    Water,
    Hybrid,
}

impl HeatingTech {
    /// Water-bearing circuits have valves that need anti-seize cycling.
    pub fn has_valve(self) -> bool {
        matches!(self, HeatingTech::Water | HeatingTech::Hybrid)
    }
}

/// Operating mode selecting which configured setpoint governs the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    Comfort,
    Eco,
    Frost,
}

/// Per-zone fault recorded by tick isolation or the maintenance monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultCode {
    /// A sensor delivered a non-finite or impossible reading.
    SensorFault,
    /// Valve commanded open but no flow measured.
    ValveStuck,
    /// Measured flow deviates too far from the expected-flow model.
    FlowAnomaly,
}

/// Static configuration for creating a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    pub tech: HeatingTech,
    pub material: FloorMaterial,
    #[serde(default = "default_comfort")]
    pub comfort_temp: f64,
    #[serde(default = "default_eco")]
    pub eco_temp: f64,
    #[serde(default = "default_frost")]
    pub frost_temp: f64,
    /// Lower override of the material's maximum floor temperature. Values
    /// above the material limit are clipped to it.
    #[serde(default)]
    pub max_floor_temp: Option<f64>,
    #[serde(default = "default_area")]
    pub area_m2: f64,
    /// Installed electrical power or flow-equivalent power (W).
    #[serde(default = "default_power")]
    pub power_w: f64,
    /// Dimensionless thermal-mass coefficient of the floor build-up.
    #[serde(default = "default_thermal_mass")]
    pub thermal_mass: f64,
    /// Thermal response time constant in seconds, used for anticipation.
    #[serde(default = "default_response_time")]
    pub response_time_s: f64,
}

fn default_comfort() -> f64 {
    22.0
}
fn default_eco() -> f64 {
    18.0
}
fn default_frost() -> f64 {
    7.0
}
fn default_area() -> f64 {
    12.0
}
fn default_power() -> f64 {
    1200.0
}
fn default_thermal_mass() -> f64 {
    0.8
}
fn default_response_time() -> f64 {
    1800.0
}

/// One heating circuit: configuration, live state, committed output, history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub tech: HeatingTech,
    pub material: FloorMaterial,
    pub mode: OperatingMode,

    pub comfort_temp: f64,
    pub eco_temp: f64,
    pub frost_temp: f64,
    /// The currently governing setpoint, before per-tick compensation.
    pub target_temp: f64,

    pub air_temp: f64,
    pub floor_temp: f64,
    pub humidity: f64,
    pub moisture: bool,
    pub battery_percent: f64,
    /// Measured flow rate (water/hybrid circuits), arbitrary units.
    pub flow_rate: f64,

    pub heating_active: bool,
    /// Committed actuator output in percent, always in [0, 100].
    pub output_percent: f64,
    pub max_floor_temp: f64,
    pub area_m2: f64,
    pub power_w: f64,
    pub thermal_mass: f64,
    pub response_time_s: f64,

    pub energy_today_kwh: f64,
    pub cost_today: f64,
    pub energy_lifetime_kwh: f64,
    pub cost_lifetime: f64,

    pub fault: Option<FaultCode>,
    pub history: ZoneHistory,
}

impl Zone {
    /// Build a zone from its spec, checking the configuration invariants.
    pub fn new(spec: ZoneSpec) -> ZoneResult<Self> {
        validate_ladder(spec.frost_temp, spec.eco_temp, spec.comfort_temp)?;
        ensure_finite(spec.area_m2, "area_m2")?;
        ensure_finite(spec.power_w, "power_w")?;
        ensure_finite(spec.thermal_mass, "thermal_mass")?;
        ensure_finite(spec.response_time_s, "response_time_s")?;
        if let Some(v) = spec.max_floor_temp {
            ensure_finite(v, "max_floor_temp")?;
        }
        if spec.area_m2 <= 0.0 {
            return Err(ZoneError::InvalidValue {
                field: "area_m2",
                value: spec.area_m2,
                reason: "must be positive",
            });
        }
        if spec.power_w <= 0.0 {
            return Err(ZoneError::InvalidValue {
                field: "power_w",
                value: spec.power_w,
                reason: "must be positive",
            });
        }
        if spec.response_time_s <= 0.0 {
            return Err(ZoneError::InvalidValue {
                field: "response_time_s",
                value: spec.response_time_s,
                reason: "must be positive",
            });
        }

        let material_max = spec.material.limits().max_temp_c;
        let max_floor_temp = spec
            .max_floor_temp
            .map_or(material_max, |v| v.min(material_max));

        Ok(Self {
            name: spec.name,
            tech: spec.tech,
            material: spec.material,
            mode: OperatingMode::Eco,
            comfort_temp: spec.comfort_temp,
            eco_temp: spec.eco_temp,
            frost_temp: spec.frost_temp,
            target_temp: spec.eco_temp,
            air_temp: spec.eco_temp,
            floor_temp: spec.eco_temp,
            humidity: 45.0,
            moisture: false,
            battery_percent: 100.0,
            flow_rate: 0.0,
            heating_active: false,
            output_percent: 0.0,
            max_floor_temp,
            area_m2: spec.area_m2,
            power_w: spec.power_w,
            thermal_mass: spec.thermal_mass,
            response_time_s: spec.response_time_s,
            energy_today_kwh: 0.0,
            cost_today: 0.0,
            energy_lifetime_kwh: 0.0,
            cost_lifetime: 0.0,
            fault: None,
            history: ZoneHistory::new(),
        })
    }

    /// The configured setpoint for a mode.
    pub fn setpoint_for_mode(&self, mode: OperatingMode) -> f64 {
        match mode {
            OperatingMode::Comfort => self.comfort_temp,
            OperatingMode::Eco => self.eco_temp,
            OperatingMode::Frost => self.frost_temp,
        }
    }

    /// Switch mode, re-basing the target on the mode's setpoint.
    /// Returns the previous mode when a change actually happened.
    pub fn set_mode(&mut self, mode: OperatingMode) -> Option<OperatingMode> {
        if self.mode == mode {
            return None;
        }
        let prev = self.mode;
        self.mode = mode;
        self.target_temp = self.setpoint_for_mode(mode);
        Some(prev)
    }

    /// Validate and apply a caller-requested target temperature.
    ///
    /// Rejection leaves the current target untouched.
    pub fn set_target(&mut self, target: f64) -> ZoneResult<()> {
        let max = self.material.limits().max_temp_c;
        if target > max {
            return Err(ZoneError::OutOfMaterialRange {
                requested: target,
                max,
            });
        }
        if target < self.frost_temp {
            return Err(ZoneError::BelowFrostFloor {
                requested: target,
                frost: self.frost_temp,
            });
        }
        self.target_temp = target;
        Ok(())
    }

    /// Apply a partial sensor update; absent fields leave state untouched.
    /// Non-finite values are dropped rather than committed.
    pub fn apply_sensor_update(&mut self, update: &SensorUpdate) {
        if let Some(v) = update.floor_temp.filter(|v| v.is_finite()) {
            self.floor_temp = v;
        }
        if let Some(v) = update.air_temp.filter(|v| v.is_finite()) {
            self.air_temp = v;
        }
        if let Some(v) = update.humidity.filter(|v| v.is_finite()) {
            self.humidity = v.clamp(0.0, 100.0);
        }
        if let Some(v) = update.moisture {
            self.moisture = v;
        }
        if let Some(v) = update.battery.filter(|v| v.is_finite()) {
            self.battery_percent = v.clamp(0.0, 100.0);
        }
        if let Some(v) = update.flow_rate.filter(|v| v.is_finite()) {
            self.flow_rate = v.max(0.0);
        }
    }

    /// Commit a safe output for this tick: clamp, update the heating flag,
    /// record a history sample. Returns (was_heating, is_heating).
    pub fn commit_output(&mut self, output: f64, now: NaiveDateTime) -> (bool, bool) {
        let was = self.heating_active;
        self.output_percent = output.clamp(0.0, 100.0);
        self.heating_active = self.output_percent > 0.0;
        self.history.push(ZoneSample {
            timestamp: now,
            floor_temp: self.floor_temp,
            air_temp: self.air_temp,
            target: self.target_temp,
            output: self.output_percent,
        });
        (was, self.heating_active)
    }

    /// Force heating off without recording a sample (zone removal, shutdown).
    pub fn force_off(&mut self) {
        self.output_percent = 0.0;
        self.heating_active = false;
    }
}

/// Partial sensor reading delivered by the sensor collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdate {
    #[serde(default)]
    pub floor_temp: Option<f64>,
    #[serde(default)]
    pub air_temp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub moisture: Option<bool>,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default)]
    pub flow_rate: Option<f64>,
}

pub(crate) fn validate_ladder(frost: f64, eco: f64, comfort: f64) -> ZoneResult<()> {
    if frost <= eco && eco <= comfort {
        Ok(())
    } else {
        Err(ZoneError::InvalidTemperatureLadder {
            frost,
            eco,
            comfort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn spec(name: &str) -> ZoneSpec {
        ZoneSpec {
            name: name.to_string(),
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
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_zone_starts_in_eco() {
        let zone = Zone::new(spec("kitchen")).unwrap();
        assert_eq!(zone.mode, OperatingMode::Eco);
        assert_eq!(zone.target_temp, 18.0);
        assert_eq!(zone.max_floor_temp, 33.0);
        assert!(!zone.heating_active);
    }

    #[test]
    fn ladder_violation_rejected() {
        let mut s = spec("bad");
        s.eco_temp = 25.0; // eco above comfort
        assert!(matches!(
            Zone::new(s),
            Err(ZoneError::InvalidTemperatureLadder { .. })
        ));
    }

    #[test]
    fn non_finite_parameter_rejected() {
        let mut s = spec("bad");
        s.area_m2 = f64::NAN;
        assert!(matches!(Zone::new(s), Err(ZoneError::Core(_))));

        let mut s = spec("bad");
        s.power_w = f64::INFINITY;
        assert!(matches!(Zone::new(s), Err(ZoneError::Core(_))));
    }

    #[test]
    fn max_floor_override_cannot_exceed_material() {
        let mut s = spec("kitchen");
        s.max_floor_temp = Some(40.0);
        assert_eq!(Zone::new(s).unwrap().max_floor_temp, 33.0);

        let mut s = spec("kitchen");
        s.max_floor_temp = Some(29.0);
        assert_eq!(Zone::new(s).unwrap().max_floor_temp, 29.0);
    }

    #[test]
    fn target_above_material_max_rejected() {
        let mut zone = Zone::new(spec("kitchen")).unwrap();
        let before = zone.target_temp;
        let err = zone.set_target(34.0).unwrap_err();
        assert!(matches!(err, ZoneError::OutOfMaterialRange { .. }));
        // rejected request leaves the target untouched
        assert_eq!(zone.target_temp, before);
    }

    #[test]
    fn target_below_frost_rejected() {
        let mut zone = Zone::new(spec("kitchen")).unwrap();
        assert!(matches!(
            zone.set_target(5.0),
            Err(ZoneError::BelowFrostFloor { .. })
        ));
    }

    #[test]
    fn mode_switch_rebases_target() {
        let mut zone = Zone::new(spec("kitchen")).unwrap();
        assert_eq!(zone.set_mode(OperatingMode::Comfort), Some(OperatingMode::Eco));
        assert_eq!(zone.target_temp, 22.0);
        // idempotent
        assert_eq!(zone.set_mode(OperatingMode::Comfort), None);
    }

    #[test]
    fn partial_sensor_update_ignores_missing_and_nan() {
        let mut zone = Zone::new(spec("kitchen")).unwrap();
        zone.apply_sensor_update(&SensorUpdate {
            air_temp: Some(19.5),
            floor_temp: Some(f64::NAN),
            ..Default::default()
        });
        assert_eq!(zone.air_temp, 19.5);
        assert_eq!(zone.floor_temp, 18.0); // NaN dropped
        assert_eq!(zone.humidity, 45.0); // untouched
    }

    #[test]
    fn commit_output_reports_transitions() {
        let mut zone = Zone::new(spec("kitchen")).unwrap();
        assert_eq!(zone.commit_output(60.0, now()), (false, true));
        assert_eq!(zone.commit_output(40.0, now()), (true, true));
        assert_eq!(zone.commit_output(0.0, now()), (true, false));
        assert_eq!(zone.history.len(), 3);
    }

    #[test]
    fn commit_output_clamps_range() {
        let mut zone = Zone::new(spec("kitchen")).unwrap();
        zone.commit_output(150.0, now());
        assert_eq!(zone.output_percent, 100.0);
        zone.commit_output(-5.0, now());
        assert_eq!(zone.output_percent, 0.0);
    }
}
