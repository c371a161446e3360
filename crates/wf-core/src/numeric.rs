use crate::CoreError;

/// Floating point type used throughout the engine.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Round a temperature to the nearest 0.5 degree.
///
/// Targets committed to zones are always half-degree aligned so that small
/// compensation adjustments do not produce setpoint jitter.
pub fn round_half_degree(v: Real) -> Real {
    (v * 2.0).round() / 2.0
}

/// Exponential blend of a new value into a previous one.
///
/// `factor` is the weight of the new value: 0 keeps the old value, 1 replaces
/// it entirely.
pub fn exp_blend(prev: Real, new: Real, factor: Real) -> Real {
    prev + factor * (new - prev)
}

/// Linear penalty for a value outside `[lo, hi]`, scaled by `per_unit`.
pub fn band_penalty(v: Real, lo: Real, hi: Real, per_unit: Real) -> Real {
    if v < lo {
        (lo - v) * per_unit
    } else if v > hi {
        (v - hi) * per_unit
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_degree_rounding() {
        assert_eq!(round_half_degree(21.24), 21.0);
        assert_eq!(round_half_degree(21.25), 21.5);
        assert_eq!(round_half_degree(21.74), 21.5);
        assert_eq!(round_half_degree(-0.3), -0.5);
    }

    #[test]
    fn blend_extremes() {
        assert_eq!(exp_blend(10.0, 20.0, 0.0), 10.0);
        assert_eq!(exp_blend(10.0, 20.0, 1.0), 20.0);
        assert_eq!(exp_blend(10.0, 20.0, 0.3), 13.0);
    }

    #[test]
    fn penalty_zero_inside_band() {
        assert_eq!(band_penalty(45.0, 30.0, 60.0, 0.3), 0.0);
        assert_eq!(band_penalty(20.0, 30.0, 60.0, 0.3), 3.0);
        assert!((band_penalty(70.0, 30.0, 60.0, 0.3) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }
}
