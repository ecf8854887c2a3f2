//! # spatial-core
//!
//! Deterministic photometric and retrofit-economics engine.
//!
//! This crate answers three questions about a lit space:
//! - How bright is it at a given point, and across the floor?
//! - How far is it from the lux level it needs?
//! - What does replacing the lamps save, and when does it pay back?
//!
//! ## Key Guarantees
//!
//! 1. **Pure**: Calculators are closed-form, single-pass arithmetic
//! 2. **No I/O**: Nothing here touches the network, disk or clock
//! 3. **Validated**: Every entry point rejects non-finite or out-of-range input
//!    with [`EngineError::InvalidParameter`] instead of producing NaN
//! 4. **Owned state**: Only [`Room`] carries state, and only its two
//!    mutators change it
//!
//! ## Example
//!
//! ```rust
//! use spatial_core::{optimization_report, point_illuminance, ReportStatus, Room};
//!
//! let lux = point_illuminance(800.0, 1.0, 120.0)?;
//! assert!((lux - 254.65).abs() < 0.01);
//!
//! let report = optimization_report(20.0, 500, 800.0)?;
//! assert_eq!(report.status, ReportStatus::OptimizationRequired);
//! assert_eq!(report.bulbs_needed, 12);
//!
//! let mut room = Room::new();
//! room.set_parameters(20.0, 0.7)?;
//! room.add_light_source("Main Chandelier", 1500.0)?;
//! println!("{}", room.summary());
//! # Ok::<(), spatial_core::EngineError>(())
//! ```

pub mod compliance;
pub mod distribution;
pub mod finance;
pub mod guard;
pub mod illuminance;
pub mod room;

// Re-export main types at crate root
pub use compliance::{check_health_compliance, ComplianceVerdict, DEFAULT_ROOM_TYPE};
pub use distribution::{floor_distribution, FloorDistribution, DEFAULT_HALF_EXTENT_M, DEFAULT_RESOLUTION};
pub use finance::{
    consumption_comparison, cost_timeline, roi_and_savings, ConsumptionComparison, CostPoint,
    CostTimeline, Payback, RetrofitParams, RoiResult, CO2_KG_PER_KWH, DEFAULT_HOURS_PER_DAY,
    DEFAULT_KWH_COST_USD, DEFAULT_TIMELINE_MONTHS,
};
pub use illuminance::{
    optimization_report, point_illuminance, OptimizationReport, ReportStatus,
    DEFAULT_BEAM_ANGLE_DEG, REFERENCE_BULB_LUMENS,
};
pub use room::{LightSource, Room, RoomSummary, DEFAULT_WALL_REFLECTION};

use thiserror::Error;

/// Errors that can occur during a calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl EngineError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::InvalidParameter { name, .. } => name,
        }
    }
}

/// Round to a fixed number of decimal places (half away from zero).
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
