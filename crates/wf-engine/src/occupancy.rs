//! Occupancy tracking and geofencing pre-heat.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Per-zone occupancy state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancyState {
    pub occupied: bool,
    pub last_seen: Option<NaiveDateTime>,
    /// Derived on the occupancy tick; zero while occupied.
    pub unoccupied_minutes: f64,
}

impl OccupancyState {
    /// Presence update from the presence collaborator.
    pub fn update(&mut self, occupied: bool, now: NaiveDateTime) {
        self.occupied = occupied;
        if occupied {
            self.last_seen = Some(now);
            self.unoccupied_minutes = 0.0;
        }
    }

    /// Recompute the derived unoccupied duration.
    pub fn tick(&mut self, now: NaiveDateTime) {
        if self.occupied {
            self.unoccupied_minutes = 0.0;
            return;
        }
        self.unoccupied_minutes = match self.last_seen {
            Some(seen) => ((now - seen).num_seconds().max(0)) as f64 / 60.0,
            // never seen anyone: treat as long-unoccupied
            None => f64::INFINITY,
        };
    }
}

/// Geofencing pre-heat tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofencingConfig {
    /// Pre-heat fires when the ETA drops to this many minutes.
    pub preheat_eta_minutes: f64,
}

impl Default for GeofencingConfig {
    fn default() -> Self {
        Self {
            preheat_eta_minutes: 30.0,
        }
    }
}

/// Update injected by the presence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofencingUpdate {
    pub distance_km: f64,
    pub eta_minutes: f64,
    pub is_home: bool,
}

/// Process-wide geofencing record with a one-shot pre-heat latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeofencingState {
    pub distance_km: f64,
    pub eta_minutes: f64,
    pub is_home: bool,
    /// Set when pre-heat fired for the current approach; reset on arrival.
    pub preheat_triggered: bool,
}

impl GeofencingState {
    /// Apply an update. Returns true when the one-shot pre-heat should fire:
    /// inbound, close enough, and not already triggered for this approach.
    pub fn update(&mut self, update: GeofencingUpdate, config: &GeofencingConfig) -> bool {
        self.distance_km = update.distance_km;
        self.eta_minutes = update.eta_minutes;

        if update.is_home {
            // arrival re-arms the latch for the next trip
            self.is_home = true;
            self.preheat_triggered = false;
            return false;
        }
        self.is_home = false;

        if !self.preheat_triggered && update.eta_minutes <= config.preheat_eta_minutes {
            self.preheat_triggered = true;
            return true;
        }
        false
    }
}
