//! Range checks shared by every calculator entry point.
//!
//! Each guard returns the value unchanged on success so call sites can
//! validate and bind in one line.

use crate::EngineError;

/// Reject NaN and infinities.
pub fn finite(name: &'static str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid(name, format!("must be a finite number, got {}", value)))
    }
}

/// Require `value >= 0`.
pub fn non_negative(name: &'static str, value: f64) -> Result<f64, EngineError> {
    let value = finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::invalid(name, format!("must be non-negative, got {}", value)))
    }
}

/// Require `value > 0`.
pub fn positive(name: &'static str, value: f64) -> Result<f64, EngineError> {
    let value = finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::invalid(name, format!("must be greater than zero, got {}", value)))
    }
}

/// Require `value` in the closed interval `[min, max]`.
pub fn in_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, EngineError> {
    let value = finite(name, value)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::invalid(
            name,
            format!("must be between {} and {}, got {}", min, max, value),
        ))
    }
}

/// Beam angles are full cone widths in the open interval (0, 360).
pub fn beam_angle(name: &'static str, degrees: f64) -> Result<f64, EngineError> {
    let degrees = finite(name, degrees)?;
    if degrees > 0.0 && degrees < 360.0 {
        Ok(degrees)
    } else {
        Err(EngineError::invalid(
            name,
            format!("must be strictly between 0 and 360 degrees, got {}", degrees),
        ))
    }
}

/// Reject a computed value that left the finite range.
///
/// `name` is the input most likely to have pushed the result out of range.
pub fn finite_result(name: &'static str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid(
            name,
            format!("is out of range, the result would be {}", value),
        ))
    }
}

/// Reflection factors are fractions in [0, 1].
pub fn unit_interval(name: &'static str, value: f64) -> Result<f64, EngineError> {
    in_range(name, value, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_result() {
        assert_eq!(finite_result("distance_m", 12.5), Ok(12.5));
        assert_eq!(finite_result("distance_m", f64::INFINITY).unwrap_err().parameter(), "distance_m");
        assert!(finite_result("lumens", f64::NAN).is_err());
    }

    #[test]
    fn test_non_negative_accepts_zero() {
        assert_eq!(non_negative("lumens", 0.0), Ok(0.0));
    }

    #[test]
    fn test_non_negative_rejects_negative() {
        let err = non_negative("lumens", -5.0).unwrap_err();
        assert_eq!(err.parameter(), "lumens");
    }

    #[test]
    fn test_nan_rejected_everywhere() {
        assert!(finite("x", f64::NAN).is_err());
        assert!(non_negative("x", f64::NAN).is_err());
        assert!(positive("x", f64::INFINITY).is_err());
        assert!(unit_interval("x", f64::NAN).is_err());
        assert!(beam_angle("x", f64::NAN).is_err());
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(positive("area_sqm", 0.0).is_err());
        assert!(positive("area_sqm", 0.1).is_ok());
    }

    #[test]
    fn test_beam_angle_bounds_are_exclusive() {
        assert!(beam_angle("beam_angle_deg", 0.0).is_err());
        assert!(beam_angle("beam_angle_deg", 360.0).is_err());
        assert!(beam_angle("beam_angle_deg", 0.5).is_ok());
        assert!(beam_angle("beam_angle_deg", 359.9).is_ok());
    }

    #[test]
    fn test_unit_interval_bounds_are_inclusive() {
        assert!(unit_interval("wall_reflection", 0.0).is_ok());
        assert!(unit_interval("wall_reflection", 1.0).is_ok());
        assert!(unit_interval("wall_reflection", 1.01).is_err());
        assert!(unit_interval("wall_reflection", -0.01).is_err());
    }
}
