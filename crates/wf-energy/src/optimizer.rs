//! Thermal-mass optimizer: price-driven charge and coast.
//!
//! The floor slab is a heat battery. Below the cheap threshold every
//! non-frost zone's target is raised to bank heat in the mass; above the
//! expensive threshold targets are pulled back to eco and the banked heat
//! carries the room.

use serde::{Deserialize, Serialize};

use wf_zone::{OperatingMode, Zone};

/// Price thresholds and charge parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Below this price (currency/kWh) the optimizer charges the mass.
    pub cheap_threshold: f64,
    /// Above this price the optimizer coasts on stored heat.
    pub expensive_threshold: f64,
    /// Target bump applied while charging (°C).
    pub charge_boost_c: f64,
    /// Safety margin kept below the material maximum while charging (°C).
    pub charge_margin_c: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            cheap_threshold: 0.80,
            expensive_threshold: 2.50,
            charge_boost_c: 2.0,
            charge_margin_c: 1.0,
        }
    }
}

/// Classification of a price update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceAction {
    /// Cheap energy: bank heat in the floor mass.
    Charge,
    /// Expensive energy: pull targets back to eco.
    Coast,
    /// Between thresholds: leave targets alone.
    Hold,
}

/// The optimizer itself is stateless; its config classifies prices and its
/// apply functions adjust a single zone at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThermalMassOptimizer {
    pub config: OptimizerConfig,
}

impl ThermalMassOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, price: f64) -> PriceAction {
        if price < self.config.cheap_threshold {
            PriceAction::Charge
        } else if price > self.config.expensive_threshold {
            PriceAction::Coast
        } else {
            PriceAction::Hold
        }
    }

    /// Apply an action to one zone. Returns the new target when the zone's
    /// target actually changed.
    pub fn apply(&self, action: PriceAction, zone: &mut Zone) -> Option<f64> {
        match action {
            PriceAction::Charge => {
                // Frost zones are deliberately cold; charging them wastes
                // energy into unused rooms.
                if zone.mode == OperatingMode::Frost {
                    return None;
                }
                let cap = zone.material.limits().max_temp_c - self.config.charge_margin_c;
                let boosted = (zone.target_temp + self.config.charge_boost_c).min(cap);
                if boosted > zone.target_temp {
                    zone.target_temp = boosted;
                    tracing::debug!(zone = %zone.name, target = boosted, "thermal-mass charge");
                    Some(boosted)
                } else {
                    None
                }
            }
            PriceAction::Coast => {
                if zone.target_temp > zone.eco_temp {
                    zone.target_temp = zone.eco_temp;
                    tracing::debug!(zone = %zone.name, target = zone.eco_temp, "thermal-mass coast");
                    Some(zone.eco_temp)
                } else {
                    None
                }
            }
            PriceAction::Hold => None,
        }
    }
}
