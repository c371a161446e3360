//! Engine configuration: tuning for every subsystem plus the zone roster.
//!
//! Everything carries serde defaults, so a minimal YAML file only lists
//! zones. Loading validates before anything is built; a bad file never
//! produces a half-configured engine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use wf_comfort::ComfortConfig;
use wf_control::{FloorProtection, PidConfig};
use wf_energy::OptimizerConfig;
use wf_schedule::ZoneSchedule;
use wf_zone::ZoneSpec;

use crate::error::{CommandError, CommandResult};
use crate::maintenance::MaintenanceConfig;
use crate::occupancy::GeofencingConfig;
use crate::target::TargetConfig;
use crate::weather::WeatherConfig;

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Quick-heat lead time before a comfort window opens (minutes).
    pub anticipatory_minutes: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            anticipatory_minutes: 30,
        }
    }
}

/// Open-window detection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPauseConfig {
    pub enabled: bool,
    /// Air-temperature drop over the detection window that pauses heating (°C).
    pub drop_c: f64,
    /// Detection window (minutes).
    pub window_min: i64,
}

impl Default for WindowPauseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            drop_c: 1.0,
            window_min: 5,
        }
    }
}

/// Suggested cadences for the external tick driver (seconds). The engine
/// itself never sleeps; these are advisory for whoever owns the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickIntervals {
    pub control_s: u64,
    pub schedule_s: u64,
    pub energy_s: u64,
    pub weather_s: u64,
    pub occupancy_s: u64,
    pub maintenance_s: u64,
}

impl Default for TickIntervals {
    fn default() -> Self {
        Self {
            control_s: 60,
            schedule_s: 60,
            energy_s: 300,
            weather_s: 600,
            occupancy_s: 60,
            maintenance_s: 3600,
        }
    }
}

/// One zone entry in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    #[serde(flatten)]
    pub spec: ZoneSpec,
    #[serde(default)]
    pub schedule: Option<ZoneSchedule>,
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pid: PidConfig,
    pub limiter: FloorProtection,
    pub optimizer: OptimizerConfig,
    pub comfort: ComfortConfig,
    pub scheduler: SchedulerConfig,
    pub target: TargetConfig,
    pub window_pause: WindowPauseConfig,
    pub weather: WeatherConfig,
    pub geofencing: GeofencingConfig,
    pub maintenance: MaintenanceConfig,
    pub ticks: TickIntervals,
    pub zones: Vec<ZoneConfig>,
}

impl EngineConfig {
    /// Load and validate a YAML configuration file.
    pub fn load(path: &Path) -> CommandResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation not expressible in serde.
    pub fn validate(&self) -> CommandResult<()> {
        self.pid.validate().map_err(|e| CommandError::Config {
            what: e.to_string(),
        })?;
        if self.window_pause.window_min <= 0 {
            return Err(CommandError::Config {
                what: "window_pause.window_min must be positive".to_string(),
            });
        }
        if self.optimizer.cheap_threshold >= self.optimizer.expensive_threshold {
            return Err(CommandError::Config {
                what: "optimizer cheap_threshold must be below expensive_threshold".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for zone in &self.zones {
            if !seen.insert(zone.spec.name.as_str()) {
                return Err(CommandError::Config {
                    what: format!("duplicate zone name: {}", zone.spec.name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn minimal_yaml_only_lists_zones() {
        let yaml = r#"
zones:
  - name: kitchen
    tech: water
    material: tile
  - name: bathroom
    tech: electric
    material: stone
    comfort_temp: 23.0
"#;
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.zones.len(), 2);
        assert_eq!(config.zones[0].spec.comfort_temp, 22.0);
        assert_eq!(config.zones[1].spec.comfort_temp, 23.0);
        assert_eq!(config.scheduler.anticipatory_minutes, 30);
    }

    #[test]
    fn duplicate_zone_names_rejected() {
        let yaml = r#"
zones:
  - name: kitchen
    tech: water
    material: tile
  - name: kitchen
    tech: electric
    material: wood
"#;
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CommandError::Config { .. })
        ));
    }

    #[test]
    fn schedule_embedded_per_zone() {
        let yaml = r#"
zones:
  - name: kitchen
    tech: water
    material: tile
    schedule:
      active: true
      quick_heat: true
      days:
        - day: Mon
          windows:
            - start: "06:00"
              end: "08:30"
              mode: comfort
"#;
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        let schedule = config.zones[0].schedule.as_ref().unwrap();
        assert!(schedule.quick_heat);
    }

    #[test]
    fn inverted_price_thresholds_rejected() {
        let mut config = EngineConfig::default();
        config.optimizer.cheap_threshold = 3.0;
        assert!(config.validate().is_err());
    }
}
