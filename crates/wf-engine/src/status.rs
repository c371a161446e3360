//! Read-only zone status snapshot for the command API.

use serde::Serialize;

use wf_zone::{FaultCode, FloorMaterial, HeatingTech, OperatingMode, Zone};

/// Point-in-time snapshot of one zone, safe to hand to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneStatus {
    pub name: String,
    pub tech: HeatingTech,
    pub material: FloorMaterial,
    pub mode: OperatingMode,
    pub target_temp: f64,
    pub air_temp: f64,
    pub floor_temp: f64,
    pub max_floor_temp: f64,
    pub humidity: f64,
    pub heating_active: bool,
    pub output_percent: f64,
    pub energy_today_kwh: f64,
    pub cost_today: f64,
    pub battery_percent: f64,
    pub fault: Option<FaultCode>,
}

impl From<&Zone> for ZoneStatus {
    fn from(zone: &Zone) -> Self {
        Self {
            name: zone.name.clone(),
            tech: zone.tech,
            material: zone.material,
            mode: zone.mode,
            target_temp: zone.target_temp,
            air_temp: zone.air_temp,
            floor_temp: zone.floor_temp,
            max_floor_temp: zone.max_floor_temp,
            humidity: zone.humidity,
            heating_active: zone.heating_active,
            output_percent: zone.output_percent,
            energy_today_kwh: zone.energy_today_kwh,
            cost_today: zone.cost_today,
            battery_percent: zone.battery_percent,
            fault: zone.fault,
        }
    }
}
