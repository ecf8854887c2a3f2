//! Tool declarations handed to the agent framework.
//!
//! Numeric parameters accept strings as well as numbers, because model output
//! frequently carries units ("800 lm", "$4.99"). Coercion happens in
//! [`super::args`] after the schema check.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Every tool the runtime can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    CalculateLuxAtPoint,
    GenerateOptimizationReport,
    CalculateRoiAndSavings,
    CheckHealthCompliance,
    SetRoomParameters,
    AddLightSource,
    GetRoomSummary,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::CalculateLuxAtPoint,
        ToolKind::GenerateOptimizationReport,
        ToolKind::CalculateRoiAndSavings,
        ToolKind::CheckHealthCompliance,
        ToolKind::SetRoomParameters,
        ToolKind::AddLightSource,
        ToolKind::GetRoomSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CalculateLuxAtPoint => "calculate_lux_at_point",
            Self::GenerateOptimizationReport => "generate_optimization_report",
            Self::CalculateRoiAndSavings => "calculate_roi_and_savings",
            Self::CheckHealthCompliance => "check_health_compliance",
            Self::SetRoomParameters => "set_room_parameters",
            Self::AddLightSource => "add_light_source",
            Self::GetRoomSummary => "get_room_summary",
        }
    }

    /// Whether the tool changes session state.
    pub fn mutates_room(&self) -> bool {
        matches!(self, Self::SetRoomParameters | Self::AddLightSource)
    }

    pub fn definition(&self) -> ToolDefinition {
        let (description, parameters) = match self {
            Self::CalculateLuxAtPoint => (
                "Calculate the illuminance (lux) directly below a light source using the inverse square law. \
                 Returns 0 for a distance of zero or less.",
                object(
                    json!({
                        "light_lumens": number("Total luminous flux of the source in lumens, e.g. 800 for a standard LED bulb."),
                        "distance_meters": number("Distance from the source to the surface in meters."),
                        "beam_angle_degrees": number("Full beam angle in degrees, between 0 and 360. Defaults to 120."),
                    }),
                    &["light_lumens", "distance_meters"],
                ),
            ),
            Self::GenerateOptimizationReport => (
                "Compare the lumens installed in an area against a target lux level and size the deficit \
                 in 800 lm reference bulbs.",
                object(
                    json!({
                        "room_area_sqm": number("Floor area in square meters. Must be greater than zero."),
                        "target_lux": whole("Required illuminance in lux, e.g. 500 for office work."),
                        "current_lumens": number("Total lumens currently installed."),
                    }),
                    &["room_area_sqm", "target_lux", "current_lumens"],
                ),
            ),
            Self::CalculateRoiAndSavings => (
                "Calculate annual energy savings, CO2 reduction and payback period for replacing bulbs \
                 with more efficient ones.",
                object(
                    json!({
                        "old_watts": number("Wattage of the current bulb, e.g. 60 for an incandescent."),
                        "new_watts": number("Wattage of the replacement bulb, e.g. 9 for an LED."),
                        "new_bulb_price": number("Price of ONE replacement bulb in USD. Defaults to 0."),
                        "hours_per_day": number("Average daily usage in hours. Defaults to 5."),
                        "kwh_cost_usd": number("Electricity cost per kWh in USD. Defaults to 0.17."),
                        "count": whole("Number of bulbs replaced. Defaults to 1."),
                    }),
                    &["old_watts", "new_watts"],
                ),
            ),
            Self::CheckHealthCompliance => (
                "Check whether a lux level meets the health standard for a room type \
                 (office, kitchen, living_room, corridor, bedroom). Returns PASS or FAIL with the deficit.",
                object(
                    json!({
                        "lux_level": number("Measured or estimated illuminance in lux."),
                        "room_type": {
                            "type": "string",
                            "description": "Room type, e.g. office, kitchen, living_room. Defaults to office.",
                        },
                    }),
                    &["lux_level"],
                ),
            ),
            Self::SetRoomParameters => (
                "Set the floor area and wall reflection of the room in this session.",
                object(
                    json!({
                        "area_sqm": number("Floor area in square meters."),
                        "wall_reflection": number("Wall reflection factor from 0.1 (dark) to 0.9 (white). Keeps the current value when omitted."),
                    }),
                    &["area_sqm"],
                ),
            ),
            Self::AddLightSource => (
                "Add a lamp or window to the room in this session.",
                object(
                    json!({
                        "name": {
                            "type": "string",
                            "minLength": 1,
                            "description": "Name of the source, e.g. Ceiling Lamp.",
                        },
                        "lumens": number("Luminous flux of the source in lumens."),
                    }),
                    &["name", "lumens"],
                ),
            ),
            Self::GetRoomSummary => (
                "Describe the room in this session: area, wall reflection, light sources and estimated lux.",
                object(json!({}), &[]),
            ),
        };

        ToolDefinition {
            name: self.as_str().to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| s.to_string())
    }
}

/// A function declaration as exposed to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,

    /// JSON Schema for the arguments object
    pub parameters: Value,
}

/// Declarations for every tool, in a stable order.
pub fn all_definitions() -> Vec<ToolDefinition> {
    ToolKind::ALL.iter().map(ToolKind::definition).collect()
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn number(description: &str) -> Value {
    json!({
        "type": ["number", "string"],
        "description": description,
    })
}

fn whole(description: &str) -> Value {
    json!({
        "type": ["integer", "string"],
        "description": description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.as_str().parse::<ToolKind>(), Ok(kind));
        }
        assert!("summon_lamp".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for kind in ToolKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_definitions_are_objects() {
        let defs = all_definitions();
        assert_eq!(defs.len(), 7);
        for def in &defs {
            assert_eq!(def.parameters["type"], "object");
            assert_eq!(def.parameters["additionalProperties"], false);
            assert!(!def.description.is_empty());
        }
    }

    #[test]
    fn test_required_fields() {
        let def = ToolKind::CalculateRoiAndSavings.definition();
        assert_eq!(def.parameters["required"], json!(["old_watts", "new_watts"]));

        let def = ToolKind::GetRoomSummary.definition();
        assert_eq!(def.parameters["required"], json!([]));
    }

    #[test]
    fn test_only_state_tools_mutate() {
        let mutating: Vec<_> = ToolKind::ALL.iter().filter(|k| k.mutates_room()).collect();
        assert_eq!(mutating, vec![&ToolKind::SetRoomParameters, &ToolKind::AddLightSource]);
    }
}
