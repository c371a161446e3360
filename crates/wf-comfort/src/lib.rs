//! wf-comfort: simplified thermal-comfort scoring for warmflow zones.
//!
//! A deliberately reduced Fanger model: PMV is a linear function of the
//! operative temperature's deviation from an ideal, PPD follows the standard
//! exponential approximation, and floor temperature and humidity outside
//! their comfort bands subtract linear penalties. The constants are
//! heuristics carried as named, overridable configuration; no physical
//! accuracy is claimed beyond what the tests pin down.

use serde::{Deserialize, Serialize};

use wf_core::band_penalty;
use wf_zone::Zone;

/// Tunable constants of the comfort model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortConfig {
    /// Operative temperature everyone is assumed happiest at (°C).
    pub ideal_operative_c: f64,
    /// PMV per °C of deviation from the ideal.
    pub pmv_sensitivity: f64,
    /// Radiant estimate weight of the floor temperature.
    pub radiant_floor_weight: f64,
    /// Comfortable floor surface band (°C).
    pub floor_band: (f64, f64),
    /// Penalty points per °C of floor outside the band.
    pub floor_penalty_per_c: f64,
    /// Comfortable relative-humidity band (%).
    pub humidity_band: (f64, f64),
    /// Penalty points per % of humidity outside the band.
    pub humidity_penalty_per_pct: f64,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        Self {
            ideal_operative_c: 21.5,
            pmv_sensitivity: 0.33,
            radiant_floor_weight: 0.4,
            floor_band: (19.0, 26.0),
            floor_penalty_per_c: 4.0,
            humidity_band: (30.0, 60.0),
            humidity_penalty_per_pct: 0.3,
        }
    }
}

/// Qualitative rating buckets over the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComfortRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Bad,
}

impl ComfortRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            ComfortRating::Excellent
        } else if score >= 70.0 {
            ComfortRating::Good
        } else if score >= 50.0 {
            ComfortRating::Fair
        } else if score >= 30.0 {
            ComfortRating::Poor
        } else {
            ComfortRating::Bad
        }
    }
}

/// Comfort assessment of one zone at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortAssessment {
    /// Predicted mean vote, clamped to [-3, 3].
    pub pmv: f64,
    /// Predicted percentage dissatisfied, in [5, 100].
    pub ppd: f64,
    /// Overall score in [0, 100].
    pub score: f64,
    pub rating: ComfortRating,
}

/// Score a zone's current readings.
pub fn assess(config: &ComfortConfig, zone: &Zone) -> ComfortAssessment {
    let radiant = config.radiant_floor_weight * zone.floor_temp
        + (1.0 - config.radiant_floor_weight) * zone.air_temp;
    let operative = (zone.air_temp + radiant) / 2.0;

    let pmv = ((operative - config.ideal_operative_c) * config.pmv_sensitivity).clamp(-3.0, 3.0);
    let ppd = 100.0 - 95.0 * (-0.03353 * pmv.powi(4) - 0.2179 * pmv.powi(2)).exp();

    let (floor_lo, floor_hi) = config.floor_band;
    let floor_penalty =
        band_penalty(zone.floor_temp, floor_lo, floor_hi, config.floor_penalty_per_c);
    let (hum_lo, hum_hi) = config.humidity_band;
    let humidity_penalty =
        band_penalty(zone.humidity, hum_lo, hum_hi, config.humidity_penalty_per_pct);

    let score = (100.0 - ppd - floor_penalty - humidity_penalty).clamp(0.0, 100.0);

    ComfortAssessment {
        pmv,
        ppd,
        score,
        rating: ComfortRating::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_zone::{FloorMaterial, HeatingTech, ZoneSpec};

    fn zone(air: f64, floor: f64, humidity: f64) -> Zone {
        let mut z = Zone::new(ZoneSpec {
            name: "z".to_string(),
            tech: HeatingTech::Water,
            material: FloorMaterial::Tile,
            comfort_temp: 22.0,
            eco_temp: 18.0,
            frost_temp: 7.0,
            max_floor_temp: None,
            area_m2: 12.0,
            power_w: 1200.0,
            thermal_mass: 0.8,
            response_time_s: 1800.0,
        })
        .unwrap();
        z.air_temp = air;
        z.floor_temp = floor;
        z.humidity = humidity;
        z
    }

    #[test]
    fn ideal_conditions_score_excellent() {
        let assessment = assess(&ComfortConfig::default(), &zone(21.5, 21.5, 45.0));
        assert!(assessment.pmv.abs() < 1e-9);
        // PPD bottoms out at 5 % by construction
        assert!((assessment.ppd - 5.0).abs() < 1e-9);
        assert!(assessment.score >= 85.0);
        assert_eq!(assessment.rating, ComfortRating::Excellent);
    }

    #[test]
    fn cold_room_scores_poorly() {
        let assessment = assess(&ComfortConfig::default(), &zone(14.0, 13.0, 45.0));
        assert!(assessment.pmv < -1.5);
        assert!(assessment.score < 50.0);
    }

    #[test]
    fn pmv_clamped_to_scale() {
        let assessment = assess(&ComfortConfig::default(), &zone(45.0, 45.0, 45.0));
        assert_eq!(assessment.pmv, 3.0);
        let assessment = assess(&ComfortConfig::default(), &zone(-10.0, -10.0, 45.0));
        assert_eq!(assessment.pmv, -3.0);
    }

    #[test]
    fn humidity_outside_band_penalized() {
        let dry = assess(&ComfortConfig::default(), &zone(21.5, 21.5, 15.0));
        let comfortable = assess(&ComfortConfig::default(), &zone(21.5, 21.5, 45.0));
        assert!(dry.score < comfortable.score);
    }

    #[test]
    fn rating_bucket_edges() {
        assert_eq!(ComfortRating::from_score(85.0), ComfortRating::Excellent);
        assert_eq!(ComfortRating::from_score(84.9), ComfortRating::Good);
        assert_eq!(ComfortRating::from_score(70.0), ComfortRating::Good);
        assert_eq!(ComfortRating::from_score(50.0), ComfortRating::Fair);
        assert_eq!(ComfortRating::from_score(30.0), ComfortRating::Poor);
        assert_eq!(ComfortRating::from_score(29.9), ComfortRating::Bad);
    }
}


#[cfg(test)]
pub(crate) mod tests_helpers {
    use wf_zone::{FloorMaterial, HeatingTech, Zone, ZoneSpec};

    pub fn make_zone(air: f64, floor: f64, humidity: f64) -> Zone {
        let mut z = Zone::new(ZoneSpec {
            name: "z".to_string(),
            tech: HeatingTech::Water,
            material: FloorMaterial::Tile,
            comfort_temp: 22.0,
            eco_temp: 18.0,
            frost_temp: 7.0,
            max_floor_temp: None,
            area_m2: 12.0,
            power_w: 1200.0,
            thermal_mass: 0.8,
            response_time_s: 1800.0,
        })
        .unwrap();
        z.air_temp = air;
        z.floor_temp = floor;
        z.humidity = humidity;
        z
    }
}
