//! Maintenance monitoring: valve health, flow anomalies, anti-seize cycling.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use wf_core::ZoneId;
use wf_zone::{FaultCode, Zone};

/// Maintenance thresholds and cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Valve positions above this are expected to produce flow (%).
    pub valve_open_threshold_pct: f64,
    /// Flow readings below this count as "no flow".
    pub flow_epsilon: f64,
    /// Expected flow per percent of valve position.
    pub flow_constant: f64,
    /// Fractional deviation from the expected-flow model that flags an
    /// anomaly.
    pub flow_deviation_frac: f64,
    /// Days between anti-seize cycles.
    pub anti_seize_interval_days: i64,
    /// Duration of each anti-seize phase (seconds).
    pub anti_seize_phase_s: i64,

    // Health score deduction weights.
    pub deduct_valve_stuck: f64,
    pub deduct_flow_anomaly: f64,
    pub deduct_fault: f64,
    pub deduct_low_battery: f64,
    pub deduct_moisture: f64,
    /// Battery percentage below which the deduction applies.
    pub low_battery_pct: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            valve_open_threshold_pct: 20.0,
            flow_epsilon: 0.5,
            flow_constant: 0.04,
            flow_deviation_frac: 0.4,
            anti_seize_interval_days: 7,
            anti_seize_phase_s: 30,
            deduct_valve_stuck: 25.0,
            deduct_flow_anomaly: 10.0,
            deduct_fault: 15.0,
            deduct_low_battery: 5.0,
            deduct_moisture: 20.0,
            low_battery_pct: 20.0,
        }
    }
}

/// Phase of a timed anti-seize sequence. Each phase holds for the configured
/// duration; the maintenance tick advances it. Nothing blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntiSeizePhase {
    /// Valve driven fully open.
    Opening,
    /// Valve driven fully closed.
    Closing,
}

/// One in-flight anti-seize cycle for one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntiSeizeCycle {
    pub zone: ZoneId,
    pub phase: AntiSeizePhase,
    pub phase_started: NaiveDateTime,
    /// Output to restore once the cycle completes.
    pub prior_output: f64,
}

/// Maintenance monitor state owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceState {
    pub last_anti_seize: Option<NaiveDateTime>,
    pub cycles: Vec<AntiSeizeCycle>,
}

impl MaintenanceState {
    /// Whether the periodic anti-seize run is due at `now`. The first tick
    /// anchors the clock instead of cycling immediately.
    pub fn anti_seize_due(&mut self, now: NaiveDateTime, config: &MaintenanceConfig) -> bool {
        match self.last_anti_seize {
            None => {
                self.last_anti_seize = Some(now);
                false
            }
            Some(last) => {
                if (now - last).num_days() >= config.anti_seize_interval_days {
                    self.last_anti_seize = Some(now);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn cycle_active(&self, zone: ZoneId) -> bool {
        self.cycles.iter().any(|c| c.zone == zone)
    }
}

/// One reported maintenance issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaintenanceIssue {
    ValveStuck { zone: String },
    FlowAnomaly { zone: String },
    Fault { zone: String },
    LowBattery { zone: String, percent: f64 },
    Moisture { zone: String },
}

/// Deduction-based system health report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceReport {
    /// 100 minus weighted deductions, floored at 0.
    pub health_score: f64,
    pub issues: Vec<MaintenanceIssue>,
}

/// Score the current zone population.
pub fn health_report<'a>(
    config: &MaintenanceConfig,
    zones: impl Iterator<Item = &'a Zone>,
) -> MaintenanceReport {
    let mut score = 100.0;
    let mut issues = Vec::new();

    for zone in zones {
        match zone.fault {
            Some(FaultCode::ValveStuck) => {
                score -= config.deduct_valve_stuck;
                issues.push(MaintenanceIssue::ValveStuck {
                    zone: zone.name.clone(),
                });
            }
            Some(FaultCode::FlowAnomaly) => {
                score -= config.deduct_flow_anomaly;
                issues.push(MaintenanceIssue::FlowAnomaly {
                    zone: zone.name.clone(),
                });
            }
            Some(FaultCode::SensorFault) => {
                score -= config.deduct_fault;
                issues.push(MaintenanceIssue::Fault {
                    zone: zone.name.clone(),
                });
            }
            None => {}
        }
        if zone.battery_percent < config.low_battery_pct {
            score -= config.deduct_low_battery;
            issues.push(MaintenanceIssue::LowBattery {
                zone: zone.name.clone(),
                percent: zone.battery_percent,
            });
        }
        if zone.moisture {
            score -= config.deduct_moisture;
            issues.push(MaintenanceIssue::Moisture {
                zone: zone.name.clone(),
            });
        }
    }

    MaintenanceReport {
        health_score: score.max(0.0),
        issues,
    }
}
