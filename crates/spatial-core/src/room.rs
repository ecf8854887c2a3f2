//! Room state aggregator.
//!
//! A [`Room`] collects named light sources and estimates the average
//! illuminance they produce:
//!
//! ```text
//! lux = Σ lumens × (1 + wall_reflection × 0.5) / area
//! ```
//!
//! This is a single-bounce approximation in which bright walls add up to
//! half the direct flux back into the room. It is not radiosity and does not
//! try to be.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{guard, EngineError};

/// Reflection of mid-tone walls.
pub const DEFAULT_WALL_REFLECTION: f64 = 0.5;

/// Share of the reflection factor returned to the room as extra flux.
const REFLECTION_GAIN: f64 = 0.5;

/// A lamp or window contributing flux to a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightSource {
    pub name: String,
    pub lumens: f64,
}

impl fmt::Display for LightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}lm)", self.name, self.lumens)
    }
}

/// A room and the light sources installed in it.
///
/// Area and reflection may be overwritten at any time; sources can only be
/// appended. Rooms are only built through the validating constructors, so
/// there is no way to read one back from JSON:
///
/// ```compile_fail
/// let room: spatial_core::Room =
///     serde_json::from_str(r#"{"area_sqm": -1.0, "wall_reflection": 5.0, "sources": []}"#).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Room {
    area_sqm: f64,
    wall_reflection: f64,
    sources: Vec<LightSource>,
}

impl Room {
    /// An empty room with no area and mid-tone walls.
    pub fn new() -> Self {
        Self {
            area_sqm: 0.0,
            wall_reflection: DEFAULT_WALL_REFLECTION,
            sources: Vec::new(),
        }
    }

    /// An empty room with validated dimensions.
    pub fn with_parameters(area_sqm: f64, wall_reflection: f64) -> Result<Self, EngineError> {
        let mut room = Self::new();
        room.set_parameters(area_sqm, wall_reflection)?;
        Ok(room)
    }

    pub fn area_sqm(&self) -> f64 {
        self.area_sqm
    }

    pub fn wall_reflection(&self) -> f64 {
        self.wall_reflection
    }

    pub fn sources(&self) -> &[LightSource] {
        &self.sources
    }

    /// Overwrite area and wall reflection.
    pub fn set_parameters(&mut self, area_sqm: f64, wall_reflection: f64) -> Result<(), EngineError> {
        let area_sqm = guard::non_negative("area_sqm", area_sqm)?;
        let wall_reflection = guard::unit_interval("wall_reflection", wall_reflection)?;

        self.area_sqm = area_sqm;
        self.wall_reflection = wall_reflection;

        debug!(area_sqm, wall_reflection, "room parameters set");
        Ok(())
    }

    /// Append a light source. Duplicate names are kept as separate sources.
    pub fn add_light_source(&mut self, name: impl Into<String>, lumens: f64) -> Result<(), EngineError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::invalid("name", "must not be empty"));
        }
        let lumens = guard::non_negative("lumens", lumens)?;

        debug!(name, lumens, "light source added");
        self.sources.push(LightSource {
            name: name.to_string(),
            lumens,
        });
        Ok(())
    }

    /// Total installed flux.
    pub fn total_lumens(&self) -> f64 {
        // Summed smallest-first so the total is identical for any insertion order.
        let mut lumens: Vec<f64> = self.sources.iter().map(|s| s.lumens).collect();
        lumens.sort_by(f64::total_cmp);
        lumens.iter().sum()
    }

    /// Estimated average illuminance, or 0.0 for a room without area.
    pub fn current_lux(&self) -> f64 {
        if self.area_sqm <= 0.0 {
            return 0.0;
        }

        let effective_lumens = self.total_lumens() * (1.0 + self.wall_reflection * REFLECTION_GAIN);
        effective_lumens / self.area_sqm
    }

    /// Structured snapshot of the room.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            area_sqm: self.area_sqm,
            wall_reflection: self.wall_reflection,
            sources: self.sources.clone(),
            current_lux: self.current_lux(),
        }
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a [`Room`], rendered to text for tool output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSummary {
    pub area_sqm: f64,
    pub wall_reflection: f64,
    pub sources: Vec<LightSource>,
    pub current_lux: f64,
}

impl fmt::Display for RoomSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources = if self.sources.is_empty() {
            "None".to_string()
        } else {
            self.sources
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        writeln!(f, "--- ROOM STATE ---")?;
        writeln!(f, "Area: {} sqm", self.area_sqm)?;
        writeln!(f, "Wall Reflection: {}", self.wall_reflection)?;
        writeln!(f, "Active Sources: {}", sources)?;
        writeln!(f, "Current Light Level: {:.2} LUX", self.current_lux)?;
        write!(f, "------------------")
    }
}
