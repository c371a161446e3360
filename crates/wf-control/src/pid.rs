//! PID heating controller with thermal-inertia anticipation.
//!
//! Underfloor circuits respond slowly: heat injected now arrives at the
//! surface many minutes later. A plain PID therefore overshoots badly. The
//! controller here projects the temperature ahead by the zone's response time
//! using the measured rate of change and backs off before the projection
//! crosses the target.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use wf_core::exp_blend;

/// PID controller configuration, shared across zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain (percent output per °C of error).
    pub kp: f64,
    /// Integral gain (percent output per °C·second of accumulated error).
    pub ki: f64,
    /// Derivative gain (percent output per °C/second of error change).
    pub kd: f64,
    /// Anti-windup band: integral accumulator is clamped to ±this value.
    pub integral_limit: f64,
    /// Overshoot guard in °C above target for the hard anticipation cut.
    pub overshoot_guard: f64,
    /// Exponential smoothing factor for the committed output, in (0, 1].
    pub smoothing: f64,
    /// Smoothed outputs below this percentage snap to zero. The exponential
    /// smoother alone only decays asymptotically, which would leave a
    /// satisfied zone nominally heating forever.
    pub off_threshold_pct: f64,
    /// Minimum dt in seconds, guarding the derivative when ticks are skipped
    /// or delivered in a burst.
    pub min_dt_s: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 15.0,
            ki: 0.05,
            kd: 80.0,
            integral_limit: 500.0,
            overshoot_guard: 0.5,
            smoothing: 0.3,
            off_threshold_pct: 0.5,
            min_dt_s: 1.0,
        }
    }
}

impl PidConfig {
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "gains must be finite",
            });
        }
        if self.integral_limit <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "integral_limit must be positive",
            });
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ControlError::InvalidArg {
                what: "smoothing must be in (0, 1]",
            });
        }
        if !(0.0..100.0).contains(&self.off_threshold_pct) {
            return Err(ControlError::InvalidArg {
                what: "off_threshold_pct must be in [0, 100)",
            });
        }
        if self.min_dt_s <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "min_dt_s must be positive",
            });
        }
        Ok(())
    }
}

/// Mutable PID state. Strictly one per zone; sharing across zones corrupts
/// the integral and derivative history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    /// Integral accumulator (°C·seconds), clamped to the anti-windup band.
    pub integral: f64,
    /// Error at the previous update.
    pub prev_error: Option<f64>,
    /// Wall-clock time of the previous update.
    pub last_update: Option<NaiveDateTime>,
    /// Raw output before smoothing, in [0, 100].
    pub raw_output: f64,
    /// Exponentially smoothed output, in [0, 100].
    pub smoothed_output: f64,
}

/// The per-zone PID controller: config + per-zone state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidController {
    pub config: PidConfig,
    pub state: PidState,
}

impl PidController {
    pub fn new(config: PidConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: PidState::default(),
        })
    }

    /// Compute the heating output in percent for this tick.
    ///
    /// `response_time_s` is the zone's thermal response time constant, used
    /// as the anticipation horizon.
    pub fn compute(
        &mut self,
        target: f64,
        current: f64,
        response_time_s: f64,
        now: NaiveDateTime,
    ) -> ControlResult<f64> {
        if !target.is_finite() {
            return Err(ControlError::NonFiniteInput { what: "target" });
        }
        if !current.is_finite() {
            return Err(ControlError::NonFiniteInput { what: "current" });
        }

        let cfg = &self.config;
        let dt = match self.state.last_update {
            Some(prev) => ((now - prev).num_milliseconds() as f64 / 1000.0).max(cfg.min_dt_s),
            None => cfg.min_dt_s,
        };

        let error = target - current;

        self.state.integral =
            (self.state.integral + error * dt).clamp(-cfg.integral_limit, cfg.integral_limit);

        let derivative = match self.state.prev_error {
            Some(prev) => (error - prev) / dt,
            None => 0.0,
        };

        let mut raw = cfg.kp * error + cfg.ki * self.state.integral + cfg.kd * derivative;

        // Thermal-inertia anticipation: the temperature moves opposite to the
        // error, so a falling error means a rising temperature.
        let temp_rate = -derivative;
        let projected = current + temp_rate * response_time_s.max(0.0);
        if projected > target + cfg.overshoot_guard {
            raw *= 0.3;
        } else if projected > target {
            raw *= 0.6;
        }

        let raw = raw.clamp(0.0, 100.0);
        self.state.raw_output = raw;
        self.state.smoothed_output = exp_blend(self.state.smoothed_output, raw, cfg.smoothing);
        if self.state.smoothed_output < cfg.off_threshold_pct {
            self.state.smoothed_output = 0.0;
        }
        self.state.prev_error = Some(error);
        self.state.last_update = Some(now);

        Ok(self.state.smoothed_output)
    }

    /// Drop accumulated state, e.g. after a long gap or a setpoint step.
    pub fn reset(&mut self) {
        self.state = PidState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::seconds(secs)
    }

    fn controller() -> PidController {
        PidController::new(PidConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        let mut cfg = PidConfig::default();
        cfg.smoothing = 0.0;
        assert!(PidController::new(cfg).is_err());
        cfg = PidConfig::default();
        cfg.integral_limit = -1.0;
        assert!(PidController::new(cfg).is_err());
    }

    #[test]
    fn cold_zone_gets_positive_output() {
        let mut pid = controller();
        let out = pid.compute(21.0, 18.0, 1800.0, at(0)).unwrap();
        assert!(out > 0.0);
        assert!(out <= 100.0);
    }

    #[test]
    fn satisfied_zone_gets_no_output() {
        let mut pid = controller();
        // At target and slightly above: raw output is clamped at zero and the
        // smoothed output stays there.
        for i in 0..10 {
            let out = pid.compute(21.0, 21.5, 1800.0, at(i * 60)).unwrap();
            assert_eq!(out, 0.0);
        }
    }

    #[test]
    fn satisfied_zone_output_reaches_exact_zero() {
        let mut pid = controller();
        // Heat for a while, then hold the zone well above target. The
        // exponential decay alone never reaches zero; the off threshold
        // must snap it there so the heating flag can actually clear.
        for i in 0..10 {
            pid.compute(22.0, 18.0, 1800.0, at(i * 60)).unwrap();
        }
        let mut last = f64::MAX;
        for i in 10..70 {
            last = pid.compute(22.0, 25.0, 1800.0, at(i * 60)).unwrap();
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn anti_windup_bounds_integral() {
        let mut pid = controller();
        // Unreachable target held for a long simulated period.
        for i in 0..10_000 {
            pid.compute(30.0, 15.0, 1800.0, at(i * 60)).unwrap();
        }
        assert!(pid.state.integral <= pid.config.integral_limit);
        assert!(pid.state.integral >= -pid.config.integral_limit);
    }

    #[test]
    fn anticipation_backs_off_on_fast_rise() {
        let mut slow = controller();
        let mut fast = controller();

        // Same error trajectory start.
        slow.compute(22.0, 20.0, 1800.0, at(0)).unwrap();
        fast.compute(22.0, 20.0, 1800.0, at(0)).unwrap();

        // One zone warms quickly; its projection crosses the target and the
        // output is cut relative to the steady zone.
        let steady = slow.compute(22.0, 20.0, 1800.0, at(60)).unwrap();
        let rising = fast.compute(22.0, 21.5, 1800.0, at(60)).unwrap();
        assert!(rising < steady);
    }

    #[test]
    fn dt_floored_on_burst_ticks() {
        let mut pid = controller();
        pid.compute(21.0, 18.0, 1800.0, at(0)).unwrap();
        // Second tick at the same timestamp: dt floors at min_dt_s instead of
        // dividing by zero.
        let out = pid.compute(21.0, 18.0, 1800.0, at(0)).unwrap();
        assert!(out.is_finite());
    }

    #[test]
    fn smoothing_damps_output_steps() {
        let mut pid = controller();
        pid.compute(21.0, 20.9, 1800.0, at(0)).unwrap();
        let small = pid.state.smoothed_output;
        // Error jumps; smoothed output moves only a fraction of the raw step.
        pid.compute(26.0, 20.9, 1800.0, at(60)).unwrap();
        let after = pid.state.smoothed_output;
        assert!(after > small);
        assert!(after < pid.state.raw_output);
    }
}
