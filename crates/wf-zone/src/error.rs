//! Error types for zone model operations.

use thiserror::Error;

/// Result type for zone model operations.
pub type ZoneResult<T> = Result<T, ZoneError>;

/// Errors that can occur when creating or mutating zones.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ZoneError {
    /// No zone with the given name is registered.
    #[error("Unknown zone: {name}")]
    UnknownZone { name: String },

    /// A zone with the given name already exists.
    #[error("Duplicate zone: {name}")]
    DuplicateZone { name: String },

    /// Requested target temperature exceeds what the floor material allows.
    #[error("Target {requested:.1} °C out of material range (max {max:.1} °C)")]
    OutOfMaterialRange { requested: f64, max: f64 },

    /// Requested target temperature is below the zone's frost floor.
    #[error("Target {requested:.1} °C below frost floor ({frost:.1} °C)")]
    BelowFrostFloor { requested: f64, frost: f64 },

    /// The frost <= eco <= comfort temperature ladder is violated.
    #[error("Invalid temperature ladder: frost {frost:.1} <= eco {eco:.1} <= comfort {comfort:.1} must hold")]
    InvalidTemperatureLadder { frost: f64, eco: f64, comfort: f64 },

    /// A zone parameter is outside its physical range.
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A zone parameter failed a shared numeric check.
    #[error(transparent)]
    Core(#[from] wf_core::CoreError),
}
