//! Floor illuminance distribution under a single luminaire.
//!
//! The luminaire hangs at `mount_height_m` above the floor origin. For a floor
//! point at horizontal radius `R` the slant range is `D = √(R² + h²)` and the
//! incidence cosine is `h / D`, giving `E = (Φ/Ω) / D² · cosθ`. Points outside
//! the beam fade out over the last fifth of the half-angle instead of being
//! cut off hard.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::illuminance::cone_solid_angle;
use crate::{guard, EngineError};

/// Half-width of the default floor patch (a 6 m × 6 m square).
pub const DEFAULT_HALF_EXTENT_M: f64 = 3.0;

/// Default number of samples per axis.
pub const DEFAULT_RESOLUTION: usize = 100;

/// Fraction of the beam half-angle at which the soft edge starts.
const FADE_START: f64 = 0.8;

/// Sampled floor illuminance on a square grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloorDistribution {
    pub lumens: f64,
    pub mount_height_m: f64,
    pub beam_angle_deg: f64,

    /// Sample coordinates along each axis (m), shared by x and y
    pub axis: Vec<f64>,

    /// Row-major lux values, `values[row * axis.len() + col]` is at `(axis[col], axis[row])`
    pub values: Vec<f64>,

    pub max_lux: f64,
    pub mean_lux: f64,
}

impl FloorDistribution {
    /// Samples per axis.
    pub fn resolution(&self) -> usize {
        self.axis.len()
    }

    /// Lux at grid cell `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> Option<f64> {
        let n = self.resolution();
        if row < n && col < n {
            self.values.get(row * n + col).copied()
        } else {
            None
        }
    }

    /// Lux at the sample nearest the floor origin.
    pub fn centre_lux(&self) -> f64 {
        let n = self.resolution();
        let nearest = |target: f64| {
            self.axis
                .iter()
                .enumerate()
                .fold((0, f64::INFINITY), |best, (i, v)| {
                    let d = (v - target).abs();
                    if d < best.1 {
                        (i, d)
                    } else {
                        best
                    }
                })
                .0
        };
        let c = nearest(0.0);
        self.values.get(c * n + c).copied().unwrap_or(0.0)
    }
}

/// Sample the floor illuminance under one luminaire.
pub fn floor_distribution(
    lumens: f64,
    mount_height_m: f64,
    beam_angle_deg: f64,
    half_extent_m: f64,
    resolution: usize,
) -> Result<FloorDistribution, EngineError> {
    let lumens = guard::non_negative("lumens", lumens)?;
    let h = guard::positive("mount_height_m", mount_height_m)?;
    let beam_angle_deg = guard::beam_angle("beam_angle_deg", beam_angle_deg)?;
    let half_extent_m = guard::positive("half_extent_m", half_extent_m)?;
    if resolution < 2 {
        return Err(EngineError::invalid(
            "resolution",
            format!("must be at least 2, got {}", resolution),
        ));
    }

    debug!(lumens, h, beam_angle_deg, resolution, "sampling floor distribution");

    let step = 2.0 * half_extent_m / (resolution - 1) as f64;
    let axis: Vec<f64> = (0..resolution)
        .map(|i| -half_extent_m + step * i as f64)
        .collect();

    let intensity = guard::finite_result("beam_angle_deg", lumens / cone_solid_angle(beam_angle_deg))?;
    let cutoff = (beam_angle_deg / 2.0).to_radians();
    let fade_width = cutoff - cutoff * FADE_START;

    let mut values = Vec::with_capacity(resolution * resolution);
    for &y in &axis {
        for &x in &axis {
            let slant_sq = x * x + y * y + h * h;
            let cos_theta = h / slant_sq.sqrt();
            let theta = cos_theta.clamp(-1.0, 1.0).acos();
            let mask = ((cutoff - theta) / fade_width).clamp(0.0, 1.0);
            values.push(intensity / slant_sq * cos_theta * mask);
        }
    }

    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(EngineError::invalid(
            "mount_height_m",
            format!("is out of range, a sample would be {}", bad),
        ));
    }
    let max_lux = values.iter().cloned().fold(0.0, f64::max);
    let mean_lux = guard::finite_result(
        "lumens",
        values.iter().sum::<f64>() / values.len() as f64,
    )?;

    Ok(FloorDistribution {
        lumens,
        mount_height_m: h,
        beam_angle_deg,
        axis,
        values,
        max_lux,
        mean_lux,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_matches_point_illuminance() {
        // Odd resolution puts a sample exactly under the lamp.
        let grid = floor_distribution(800.0, 1.0, 120.0, 3.0, 101).unwrap();
        let direct = crate::point_illuminance(800.0, 1.0, 120.0).unwrap();
        assert!((grid.centre_lux() - direct).abs() < 0.01);
        assert!((grid.max_lux - grid.centre_lux()).abs() < 1e-9);
    }

    #[test]
    fn test_outside_beam_is_dark() {
        // 60° beam from 1 m lights a disc of radius ~0.58 m; the corner is far outside.
        let grid = floor_distribution(800.0, 1.0, 60.0, 3.0, 11).unwrap();
        assert_eq!(grid.at(0, 0), Some(0.0));
        assert_eq!(grid.at(10, 10), Some(0.0));
    }

    #[test]
    fn test_grid_shape() {
        let grid = floor_distribution(1200.0, 2.5, 90.0, 2.0, 5).unwrap();
        assert_eq!(grid.resolution(), 5);
        assert_eq!(grid.values.len(), 25);
        assert_eq!(grid.axis.first(), Some(&-2.0));
        assert_eq!(grid.axis.last(), Some(&2.0));
        assert_eq!(grid.at(5, 0), None);
    }

    #[test]
    fn test_symmetric_about_origin() {
        let grid = floor_distribution(800.0, 2.0, 120.0, 3.0, 9).unwrap();
        assert!((grid.at(0, 2).unwrap() - grid.at(8, 6).unwrap()).abs() < 1e-9);
        assert!((grid.at(3, 4).unwrap() - grid.at(4, 3).unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_very_narrow_beam_has_no_nan_cells() {
        let grid = floor_distribution(800.0, 1.0, 1e-7, 3.0, 11).unwrap();
        assert!(grid.values.iter().all(|v| v.is_finite()));
        assert_eq!(grid.at(0, 0), Some(0.0));
        assert!(grid.centre_lux() > 0.0);
    }

    #[test]
    fn test_overflowing_grid_is_rejected() {
        assert!(floor_distribution(800.0, 1.0, 1e-320, 3.0, 11).is_err());
        let err = floor_distribution(800.0, 1e-200, 120.0, 3.0, 11).unwrap_err();
        assert_eq!(err.parameter(), "mount_height_m");
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(floor_distribution(800.0, 0.0, 120.0, 3.0, 10).is_err());
        assert!(floor_distribution(800.0, 1.0, 120.0, 3.0, 1).is_err());
        assert!(floor_distribution(800.0, 1.0, 120.0, -1.0, 10).is_err());
    }
}
