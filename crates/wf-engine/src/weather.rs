//! Outdoor conditions, heating-curve compensation and summer shutdown.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Outdoor reading injected by the weather collaborator. Optional fields
/// simply stay at their previous values when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OutdoorConditions {
    pub temperature: f64,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub sun_irradiance: Option<f64>,
}

/// Heating-curve and summer-shutdown tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Rolling outdoor mean above this pauses heating entirely (°C).
    pub summer_shutdown_c: f64,
    /// Number of readings in the rolling mean window.
    pub rolling_window: usize,
    /// Target boost when outdoor is at or below `mild_cold_c` (°C).
    pub mild_adjust_c: f64,
    /// Target adjustment magnitude in the extreme bands (°C).
    pub extreme_adjust_c: f64,
    pub mild_cold_c: f64,
    pub extreme_cold_c: f64,
    pub mild_warm_c: f64,
    pub extreme_warm_c: f64,
    /// Below this outdoor temperature frost protection raises zone floors (°C).
    pub hard_frost_c: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            summer_shutdown_c: 18.0,
            rolling_window: 24,
            mild_adjust_c: 1.0,
            extreme_adjust_c: 1.5,
            mild_cold_c: 0.0,
            extreme_cold_c: -10.0,
            mild_warm_c: 15.0,
            extreme_warm_c: 20.0,
            hard_frost_c: -15.0,
        }
    }
}

/// Live weather state owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct WeatherState {
    current: Option<OutdoorConditions>,
    rolling: VecDeque<f64>,
    summer_shutdown: bool,
}

impl WeatherState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new outdoor reading. Non-finite temperatures are dropped;
    /// optional fields merge over the previous reading.
    pub fn update(&mut self, cond: OutdoorConditions, window: usize) {
        if !cond.temperature.is_finite() {
            return;
        }
        let merged = match self.current {
            Some(prev) => OutdoorConditions {
                temperature: cond.temperature,
                humidity: cond.humidity.or(prev.humidity),
                wind_speed: cond.wind_speed.or(prev.wind_speed),
                sun_irradiance: cond.sun_irradiance.or(prev.sun_irradiance),
            },
            None => cond,
        };
        self.current = Some(merged);
        if self.rolling.len() >= window.max(1) {
            self.rolling.pop_front();
        }
        self.rolling.push_back(cond.temperature);
    }

    pub fn current(&self) -> Option<OutdoorConditions> {
        self.current
    }

    pub fn outdoor_temp(&self) -> Option<f64> {
        self.current.map(|c| c.temperature)
    }

    pub fn rolling_mean(&self) -> Option<f64> {
        if self.rolling.is_empty() {
            return None;
        }
        Some(self.rolling.iter().sum::<f64>() / self.rolling.len() as f64)
    }

    pub fn summer_shutdown(&self) -> bool {
        self.summer_shutdown
    }

    /// Re-evaluate summer shutdown from the rolling mean. Returns the new
    /// state when it toggled.
    pub fn evaluate_summer_shutdown(&mut self, config: &WeatherConfig) -> Option<bool> {
        let Some(mean) = self.rolling_mean() else {
            return None;
        };
        let should = mean > config.summer_shutdown_c;
        if should != self.summer_shutdown {
            self.summer_shutdown = should;
            tracing::info!(active = should, mean, "summer shutdown toggled");
            return Some(should);
        }
        None
    }

    /// Heating-curve target adjustment for the current outdoor temperature.
    ///
    /// Cold boosts the target, warmth trims it; between the mild bands the
    /// adjustment is zero.
    pub fn compensation(&self, config: &WeatherConfig) -> f64 {
        let Some(outdoor) = self.outdoor_temp() else {
            return 0.0;
        };
        if outdoor <= config.extreme_cold_c {
            config.extreme_adjust_c
        } else if outdoor <= config.mild_cold_c {
            config.mild_adjust_c
        } else if outdoor >= config.extreme_warm_c {
            -config.extreme_adjust_c
        } else if outdoor >= config.mild_warm_c {
            -config.mild_adjust_c
        } else {
            0.0
        }
    }

    /// Hard frost outside: zones must hold slightly above their frost floor.
    pub fn hard_frost(&self, config: &WeatherConfig) -> bool {
        self.outdoor_temp().is_some_and(|t| t < config.hard_frost_c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> WeatherConfig {
        WeatherConfig::default()
    }

    #[test]
    fn update_merges_optional_fields() {
        let mut state = WeatherState::new();
        state.update(
            OutdoorConditions {
                temperature: 5.0,
                humidity: Some(80.0),
                ..Default::default()
            },
            24,
        );
        state.update(
            OutdoorConditions {
                temperature: 4.0,
                ..Default::default()
            },
            24,
        );
        let current = state.current().unwrap();
        assert_eq!(current.temperature, 4.0);
        assert_eq!(current.humidity, Some(80.0));
    }

    #[test]
    fn non_finite_temperature_dropped() {
        let mut state = WeatherState::new();
        state.update(
            OutdoorConditions {
                temperature: f64::NAN,
                ..Default::default()
            },
            24,
        );
        assert!(state.current().is_none());
    }

    #[test]
    fn compensation_bands() {
        let mut state = WeatherState::new();
        let expect = [
            (-12.0, 1.5),
            (-10.0, 1.5),
            (-5.0, 1.0),
            (0.0, 1.0),
            (10.0, 0.0),
            (15.0, -1.0),
            (19.0, -1.0),
            (20.0, -1.5),
            (25.0, -1.5),
        ];
        for (outdoor, adjust) in expect {
            state.update(
                OutdoorConditions {
                    temperature: outdoor,
                    ..Default::default()
                },
                24,
            );
            assert_eq!(state.compensation(&cfg()), adjust, "outdoor {outdoor}");
        }
    }

    #[test]
    fn summer_shutdown_toggles_on_rolling_mean() {
        let mut state = WeatherState::new();
        for _ in 0..24 {
            state.update(
                OutdoorConditions {
                    temperature: 21.0,
                    ..Default::default()
                },
                24,
            );
        }
        assert_eq!(state.evaluate_summer_shutdown(&cfg()), Some(true));
        // no toggle while it stays warm
        assert_eq!(state.evaluate_summer_shutdown(&cfg()), None);

        // cold snap pushes the mean back down
        for _ in 0..24 {
            state.update(
                OutdoorConditions {
                    temperature: 5.0,
                    ..Default::default()
                },
                24,
            );
        }
        assert_eq!(state.evaluate_summer_shutdown(&cfg()), Some(false));
    }

    #[test]
    fn hard_frost_detection() {
        let mut state = WeatherState::new();
        assert!(!state.hard_frost(&cfg()));
        state.update(
            OutdoorConditions {
                temperature: -16.0,
                ..Default::default()
            },
            24,
        );
        assert!(state.hard_frost(&cfg()));
    }
}
