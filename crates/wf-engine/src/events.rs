//! Outbound engine events.
//!
//! The engine never calls consumers back. Every notable state transition is
//! pushed onto an internal queue; logging/alerting collaborators drain it
//! between ticks with [`crate::Engine::drain_events`]. This keeps core
//! timing decoupled from notification delivery.

use serde::Serialize;

use wf_energy::PriceAction;
use wf_zone::{FaultCode, OperatingMode};

/// One notification emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    HeatingStarted {
        zone: String,
    },
    HeatingStopped {
        zone: String,
    },
    /// Floor reached its maximum temperature; output was forced off.
    FloorTempLimit {
        zone: String,
        floor_temp: f64,
    },
    MoistureAlert {
        zone: String,
    },
    ModeChanged {
        zone: String,
        from: OperatingMode,
        to: OperatingMode,
        /// True when the change was anticipatory pre-heat, not a window.
        quick_heat: bool,
    },
    /// Rapid air-temperature drop: heating paused while the window is open.
    WindowOpenPause {
        zone: String,
    },
    ValveStuck {
        zone: String,
    },
    FlowAnomaly {
        zone: String,
        expected: f64,
        measured: f64,
    },
    SummerShutdown {
        active: bool,
    },
    PriceUpdated {
        price: f64,
        action: PriceAction,
    },
    /// Geofencing one-shot: occupants inbound, pre-heat kicked off.
    PreHeatTriggered {
        eta_minutes: f64,
    },
    ZoneFault {
        zone: String,
        fault: FaultCode,
    },
}
