//! Point illuminance and lumen-deficit sizing.
//!
//! The source is modelled as emitting uniformly inside a cone whose full
//! width is the beam angle:
//!
//! ```text
//! Ω   = 4π sin²(beam / 4)           solid angle of the cone (sr)
//! I   = Φ / Ω                        luminous intensity (cd)
//! E   = I / d²                       inverse-square law (lux)
//! ```
//!
//! `4π sin²(beam / 4)` equals `2π (1 − cos(beam / 2))` but does not cancel to
//! zero for very narrow beams.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::{guard, round_to, EngineError};

/// Beam angle assumed for a standard household bulb.
pub const DEFAULT_BEAM_ANGLE_DEG: f64 = 120.0;

/// Flux of the reference bulb used to turn a lumen deficit into a bulb count.
pub const REFERENCE_BULB_LUMENS: f64 = 800.0;

/// Solid angle (steradians) of a cone with the given full beam angle.
pub(crate) fn cone_solid_angle(beam_angle_deg: f64) -> f64 {
    let quarter = (beam_angle_deg / 4.0).to_radians().sin();
    4.0 * PI * quarter * quarter
}

/// Illuminance in lux directly under a source at `distance_m`.
///
/// A distance of zero or less yields `0.0` rather than an error, so that a
/// tool caller always gets a number back. The result is rounded to two
/// decimal places.
pub fn point_illuminance(
    lumens: f64,
    distance_m: f64,
    beam_angle_deg: f64,
) -> Result<f64, EngineError> {
    let lumens = guard::non_negative("lumens", lumens)?;
    let distance_m = guard::finite("distance_m", distance_m)?;
    let beam_angle_deg = guard::beam_angle("beam_angle_deg", beam_angle_deg)?;

    debug!(lumens, distance_m, beam_angle_deg, "calculating point illuminance");

    if distance_m <= 0.0 {
        return Ok(0.0);
    }

    let candela = lumens / cone_solid_angle(beam_angle_deg);
    let lux = guard::finite_result("distance_m", round_to(candela / (distance_m * distance_m), 2))?;

    debug!(lux, "point illuminance calculated");
    Ok(lux)
}

/// Outcome of comparing installed flux against what an area needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportStatus {
    #[serde(rename = "Optimal")]
    Optimal,
    #[serde(rename = "Optimization Required")]
    OptimizationRequired,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::OptimizationRequired => "Optimization Required",
        }
    }
}

/// Gap analysis between installed lumens and a target lux level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationReport {
    pub status: ReportStatus,

    /// Installed lumens spread over the area, rounded to 0.1 lux
    pub current_lux_avg: f64,

    pub target_lux: u32,

    pub room_area: f64,

    /// Missing lumens, never negative
    pub deficiency_lumens: f64,

    /// Reference bulbs needed to close the deficit
    pub bulbs_needed: u32,

    pub recommendation: String,
}

/// Size the lumen deficit of an area against a target lux level.
///
/// `area_sqm` must be strictly positive: the average lux divides by it.
pub fn optimization_report(
    area_sqm: f64,
    target_lux: u32,
    current_lumens: f64,
) -> Result<OptimizationReport, EngineError> {
    let area_sqm = guard::positive("area_sqm", area_sqm)?;
    let current_lumens = guard::non_negative("current_lumens", current_lumens)?;

    debug!(area_sqm, target_lux, current_lumens, "generating optimization report");

    let required = guard::finite_result("area_sqm", area_sqm * f64::from(target_lux))?;
    let current_lux_avg = guard::finite_result("area_sqm", round_to(current_lumens / area_sqm, 1))?;
    let deficiency = required - current_lumens;
    let missing = deficiency.max(0.0);

    let bulbs = (missing / REFERENCE_BULB_LUMENS).ceil();
    if bulbs > f64::from(u32::MAX) {
        return Err(EngineError::invalid(
            "area_sqm",
            format!("needs {} reference bulbs, more than can be counted", bulbs),
        ));
    }
    let bulbs_needed = bulbs as u32;

    let status = if deficiency > 0.0 {
        ReportStatus::OptimizationRequired
    } else {
        ReportStatus::Optimal
    };

    let recommendation = match status {
        ReportStatus::OptimizationRequired => format!(
            "CRITICAL DEFICIT. You need {} more light sources (approx {}lm each) to reach safe working standards.",
            bulbs_needed, REFERENCE_BULB_LUMENS
        ),
        ReportStatus::Optimal => format!(
            "Installed lighting already meets the {} lux target. No additional light sources are needed.",
            target_lux
        ),
    };

    debug!(deficiency, bulbs_needed, "optimization report generated");

    Ok(OptimizationReport {
        status,
        current_lux_avg,
        target_lux,
        room_area: area_sqm,
        deficiency_lumens: round_to(missing, 1),
        bulbs_needed,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario() {
        // 120° cone subtends π sr, so 800 lm gives ~254.6 cd at 1 m.
        let lux = point_illuminance(800.0, 1.0, 120.0).unwrap();
        assert!((lux - 254.65).abs() < 1e-9, "got {}", lux);
    }

    #[test]
    fn test_solid_angle_of_120_degree_cone_is_pi() {
        assert!((cone_solid_angle(120.0) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_zero_distance_returns_zero() {
        assert_eq!(point_illuminance(800.0, 0.0, 120.0).unwrap(), 0.0);
        assert_eq!(point_illuminance(800.0, -2.0, 60.0).unwrap(), 0.0);
    }

    #[test]
    fn test_narrow_beam_is_brighter() {
        let wide = point_illuminance(800.0, 2.0, 120.0).unwrap();
        let narrow = point_illuminance(800.0, 2.0, 36.0).unwrap();
        assert!(narrow > wide);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(point_illuminance(-1.0, 1.0, 120.0).is_err());
        assert!(point_illuminance(800.0, f64::NAN, 120.0).is_err());
        assert!(point_illuminance(800.0, 1.0, 0.0).is_err());
        assert!(point_illuminance(800.0, 1.0, 360.0).is_err());
    }

    #[test]
    fn test_report_for_dark_office() {
        let report = optimization_report(20.0, 500, 800.0).unwrap();
        assert_eq!(report.status, ReportStatus::OptimizationRequired);
        assert_eq!(report.deficiency_lumens, 9200.0);
        assert_eq!(report.bulbs_needed, 12);
        assert_eq!(report.current_lux_avg, 40.0);
        assert!(report.recommendation.contains("12 more light sources"));
    }

    #[test]
    fn test_report_exact_target_is_optimal() {
        let report = optimization_report(10.0, 300, 3000.0).unwrap();
        assert_eq!(report.status, ReportStatus::Optimal);
        assert_eq!(report.deficiency_lumens, 0.0);
        assert_eq!(report.bulbs_needed, 0);
    }

    #[test]
    fn test_report_surplus_clamps_deficiency() {
        let report = optimization_report(10.0, 100, 5000.0).unwrap();
        assert_eq!(report.status, ReportStatus::Optimal);
        assert_eq!(report.deficiency_lumens, 0.0);
        assert_eq!(report.current_lux_avg, 500.0);
    }

    #[test]
    fn test_report_rejects_zero_area() {
        let err = optimization_report(0.0, 500, 800.0).unwrap_err();
        assert_eq!(err.parameter(), "area_sqm");
    }

    #[test]
    fn test_very_narrow_beam_stays_finite() {
        assert!(cone_solid_angle(1e-7) > 0.0);
        assert_eq!(point_illuminance(0.0, 1.0, 1e-7).unwrap(), 0.0);

        let lux = point_illuminance(800.0, 1.0, 1e-7).unwrap();
        assert!(lux.is_finite() && lux > 0.0);
    }

    #[test]
    fn test_overflowing_illuminance_is_rejected() {
        let err = point_illuminance(800.0, 1e-200, 120.0).unwrap_err();
        assert_eq!(err.parameter(), "distance_m");
        assert!(point_illuminance(0.0, 1e-200, 120.0).is_err());
        assert!(point_illuminance(800.0, 1.0, 1e-320).is_err());
    }

    #[test]
    fn test_report_rejects_uncountable_deficit() {
        let err = optimization_report(1e12, 1000, 0.0).unwrap_err();
        assert_eq!(err.parameter(), "area_sqm");
        assert!(optimization_report(1e300, 1000, 0.0).is_err());
        assert!(optimization_report(1e-310, 0, 800.0).is_err());
    }

    #[test]
    fn test_report_bulb_count_for_large_hall() {
        let report = optimization_report(800.0, 1000, 0.0).unwrap();
        assert_eq!(report.bulbs_needed, 1000);
        assert_eq!(report.deficiency_lumens, 800_000.0);
    }

    #[test]
    fn test_status_serializes_with_display_names() {
        let json = serde_json::to_string(&ReportStatus::OptimizationRequired).unwrap();
        assert_eq!(json, "\"Optimization Required\"");
        assert_eq!(ReportStatus::Optimal.as_str(), "Optimal");
    }
}
