//! Health-standard lux targets per room type.
//!
//! | Room type | Minimum lux |
//! |-----------|-------------|
//! | anything containing "office" or "work" | 500 |
//! | anything containing "living" | 150 |
//! | kitchen | 300 |
//! | living_room | 150 |
//! | corridor | 100 |
//! | bedroom | 150 |
//! | anything else | 300 |

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{guard, EngineError};

pub const DEFAULT_ROOM_TYPE: &str = "office";

const WORK_TARGET_LUX: f64 = 500.0;
const LIVING_TARGET_LUX: f64 = 150.0;
const FALLBACK_TARGET_LUX: f64 = 300.0;

const STANDARDS: &[(&str, f64)] = &[
    ("office", 500.0),
    ("kitchen", 300.0),
    ("living_room", 150.0),
    ("corridor", 100.0),
    ("bedroom", 150.0),
];

/// Minimum lux required for a room type.
///
/// Keyword matches on the lowercased name win over the exact-key table.
pub fn target_lux_for(room_type: &str) -> f64 {
    let key = room_type.to_lowercase();

    if key.contains("office") || key.contains("work") {
        WORK_TARGET_LUX
    } else if key.contains("living") {
        LIVING_TARGET_LUX
    } else {
        STANDARDS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, lux)| *lux)
            .unwrap_or(FALLBACK_TARGET_LUX)
    }
}

/// PASS/FAIL verdict against a room's lux target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceVerdict {
    pub pass: bool,
    pub lux_level: f64,
    pub room_type: String,
    pub target_lux: f64,

    /// Lux missing to reach the target; zero when passing
    pub deficit: f64,
}

impl fmt::Display for ComplianceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pass {
            write!(
                f,
                "PASS: {:.1} Lux meets the standard for {} (Target: {} Lux).",
                self.lux_level, self.room_type, self.target_lux
            )
        } else {
            write!(
                f,
                "FAIL: {:.1} Lux is unsafe for {}. Target is {} Lux. You need +{:.1} Lux to avoid eye strain.",
                self.lux_level, self.room_type, self.target_lux, self.deficit
            )
        }
    }
}

/// Check a measured or estimated lux level against the room's standard.
pub fn check_health_compliance(
    lux_level: f64,
    room_type: &str,
) -> Result<ComplianceVerdict, EngineError> {
    let lux_level = guard::non_negative("lux_level", lux_level)?;
    let target_lux = target_lux_for(room_type);
    let pass = lux_level >= target_lux;

    debug!(lux_level, room_type, target_lux, pass, "checked compliance");

    Ok(ComplianceVerdict {
        pass,
        lux_level,
        room_type: room_type.to_string(),
        target_lux,
        deficit: if pass { 0.0 } else { target_lux - lux_level },
    })
}
