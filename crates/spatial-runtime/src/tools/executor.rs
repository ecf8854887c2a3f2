//! Tool dispatch: schema check, coercion, calculation, text rendering.

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use spatial_core::{
    check_health_compliance, optimization_report, point_illuminance, roi_and_savings, Payback,
    RetrofitParams, ReportStatus,
};

use super::args::Args;
use super::definitions::ToolKind;
use super::registry::ToolRegistry;
use super::{ToolCall, ToolOutput};
use crate::config::ToolDefaults;
use crate::session::SessionHandle;
use crate::RuntimeError;

/// Executes tool calls against a session.
pub struct ToolExecutor {
    registry: ToolRegistry,
    defaults: ToolDefaults,
}

impl ToolExecutor {
    pub fn new(defaults: ToolDefaults) -> Result<Self, RuntimeError> {
        Ok(Self {
            registry: ToolRegistry::new()?,
            defaults,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one tool call.
    pub fn execute(&self, session: &SessionHandle, call: &ToolCall) -> Result<ToolOutput, RuntimeError> {
        let kind = self.registry.lookup(&call.name)?;

        let empty = Map::new();
        let arguments = match &call.arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(RuntimeError::InvalidArguments {
                    tool: kind.to_string(),
                    errors: vec![format!("arguments must be an object, got {}", other)],
                })
            }
        };

        self.registry
            .validate(kind, &Value::Object(arguments.clone()))
            .map_err(|errors| RuntimeError::InvalidArguments {
                tool: kind.to_string(),
                errors,
            })?;

        debug!(tool = %kind, session = %session.id(), "executing tool");
        let args = Args::new(arguments);
        let invalid = |message: String| RuntimeError::InvalidArguments {
            tool: kind.to_string(),
            errors: vec![message],
        };

        let output = match kind {
            ToolKind::CalculateLuxAtPoint => {
                let lumens = args.number("light_lumens").map_err(invalid)?;
                let distance = args.number("distance_meters").map_err(invalid)?;
                let angle = args
                    .number_or("beam_angle_degrees", self.defaults.beam_angle_deg)
                    .map_err(invalid)?;

                let lux = point_illuminance(lumens, distance, angle)?;
                ToolOutput::success(
                    kind,
                    format!(
                        "Illuminance: {} lux at {} m from a {} lm source ({}° beam).",
                        lux, distance, lumens, angle
                    ),
                    json!({ "lux": lux }),
                )
            }

            ToolKind::GenerateOptimizationReport => {
                let area = args.number("room_area_sqm").map_err(invalid)?;
                let target = args.whole("target_lux").map_err(invalid)?;
                let current = args.number("current_lumens").map_err(invalid)?;

                let report = optimization_report(area, target, current)?;
                let text = format!(
                    "Status: {}\nCurrent average: {} lux (target {} lux, area {} sqm)\nDeficiency: {} lm\nRecommendation: {}",
                    report.status.as_str(),
                    report.current_lux_avg,
                    report.target_lux,
                    report.room_area,
                    report.deficiency_lumens,
                    report.recommendation
                );
                if report.status == ReportStatus::OptimizationRequired {
                    debug!(bulbs_needed = report.bulbs_needed, "deficit found");
                }
                ToolOutput::success(kind, text, serde_json::to_value(&report)?)
            }

            ToolKind::CalculateRoiAndSavings => {
                let params = RetrofitParams {
                    old_watts: args.number("old_watts").map_err(invalid)?,
                    new_watts: args.number("new_watts").map_err(invalid)?,
                    new_bulb_price: args.number_or("new_bulb_price", 0.0).map_err(invalid)?,
                    hours_per_day: args
                        .number_or("hours_per_day", self.defaults.hours_per_day)
                        .map_err(invalid)?,
                    kwh_cost_usd: args
                        .number_or("kwh_cost_usd", self.defaults.kwh_cost_usd)
                        .map_err(invalid)?,
                    count: args.whole_or("count", 1).map_err(invalid)?,
                };

                let roi = roi_and_savings(&params)?;
                let payback = match roi.payback {
                    Payback::Months { months } => format!("Payback period: {} months.", months),
                    Payback::NoInvestmentNeeded => {
                        "Payback period: none, no upfront investment.".to_string()
                    }
                    Payback::NeverRecovers => {
                        "Payback period: never, the replacement does not reduce energy use.".to_string()
                    }
                };
                let text = format!(
                    "{}\nEnergy saved: {} kWh/year\nInvestment: ${}\n{}",
                    roi.message, roi.kwh_saved_year, roi.total_investment, payback
                );
                ToolOutput::success(kind, text, serde_json::to_value(&roi)?)
            }

            ToolKind::CheckHealthCompliance => {
                let lux = args.number("lux_level").map_err(invalid)?;
                let room_type = args
                    .text_or("room_type", &self.defaults.room_type)
                    .map_err(invalid)?;

                let verdict = check_health_compliance(lux, room_type)?;
                ToolOutput::success(kind, verdict.to_string(), serde_json::to_value(&verdict)?)
            }

            ToolKind::SetRoomParameters => {
                let area = args.number("area_sqm").map_err(invalid)?;
                let reflection = args.number_opt("wall_reflection").map_err(invalid)?;

                let summary = session.update(|room| {
                    let reflection = reflection.unwrap_or(room.wall_reflection());
                    room.set_parameters(area, reflection)?;
                    Ok(room.summary())
                })?;
                debug!(area = summary.area_sqm, wall_reflection = summary.wall_reflection, "room parameters set");
                ToolOutput::success(
                    kind,
                    format!(
                        "Room parameters set: area {} sqm, wall reflection {}.\n{}",
                        summary.area_sqm, summary.wall_reflection, summary
                    ),
                    serde_json::to_value(&summary)?,
                )
            }

            ToolKind::AddLightSource => {
                let name = args.text("name").map_err(invalid)?;
                let lumens = args.number("lumens").map_err(invalid)?;

                let summary = session.update(|room| {
                    room.add_light_source(name, lumens)?;
                    Ok(room.summary())
                })?;
                debug!(name, lumens, "light source added");
                ToolOutput::success(
                    kind,
                    format!("Added source: {} ({} lm)\n{}", name.trim(), lumens, summary),
                    serde_json::to_value(&summary)?,
                )
            }

            ToolKind::GetRoomSummary => {
                let summary = session.read(|room| room.summary());
                ToolOutput::success(kind, summary.to_string(), serde_json::to_value(&summary)?)
            }
        };

        if kind.mutates_room() {
            info!(session = %session.id(), tool = %kind, "room state changed");
        }
        Ok(output)
    }

    /// Execute a tool call, turning any failure into an error output.
    ///
    /// Agent frameworks expect every tool call to produce text the model can
    /// read, so errors are reported in-band.
    pub fn execute_lenient(&self, session: &SessionHandle, call: &ToolCall) -> ToolOutput {
        match self.execute(session, call) {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %call.name, session = %session.id(), error = %e, "tool call rejected");
                ToolOutput::failure(&call.name, &e)
            }
        }
    }
}
