//! Floor-material thermal limits.
//!
//! Floor coverings tolerate different surface temperatures and heating rates.
//! The limits here bound what the floor-protection limiter allows a zone to
//! do, regardless of what the controller asks for.

use serde::{Deserialize, Serialize};

/// Floor covering above the heating circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorMaterial {
    Wood,
    Tile,
    Stone,
    Vinyl,
}

/// Thermal limits for one floor material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialLimits {
    /// Maximum permissible floor surface temperature (°C).
    pub max_temp_c: f64,
    /// Maximum floor temperature rise rate (°C per hour).
    pub max_rate_c_per_hour: f64,
    /// Minimum floor temperature the material should be held at (°C).
    pub min_temp_c: f64,
}

impl FloorMaterial {
    /// Static limit table. Wood is the most restrictive: it delaminates and
    /// gaps when heated too far or too fast.
    pub fn limits(self) -> MaterialLimits {
        match self {
            FloorMaterial::Wood => MaterialLimits {
                max_temp_c: 27.0,
                max_rate_c_per_hour: 1.5,
                min_temp_c: 5.0,
            },
            FloorMaterial::Tile => MaterialLimits {
                max_temp_c: 33.0,
                max_rate_c_per_hour: 3.0,
                min_temp_c: 5.0,
            },
            FloorMaterial::Stone => MaterialLimits {
                max_temp_c: 35.0,
                max_rate_c_per_hour: 2.5,
                min_temp_c: 5.0,
            },
            FloorMaterial::Vinyl => MaterialLimits {
                max_temp_c: 28.0,
                max_rate_c_per_hour: 2.0,
                min_temp_c: 5.0,
            },
        }
    }

    pub fn all() -> [FloorMaterial; 4] {
        [
            FloorMaterial::Wood,
            FloorMaterial::Tile,
            FloorMaterial::Stone,
            FloorMaterial::Vinyl,
        ]
    }
}
