//! Spatial CLI
//!
//! Command-line interface for illuminance, retrofit and room calculations.
//!
//! ## Usage
//!
//! ```bash
//! # Lux one meter below an 800 lm bulb
//! spatial lux --lumens 800 --distance 1
//!
//! # Retrofit economics for ten bulbs, with a three-year cost timeline
//! spatial roi --old-watts 60 --new-watts 9 --price 5 --count 10 --timeline-months 36
//!
//! # Room snapshot
//! spatial room --area 20 --reflection 0.7 --source "Main Chandelier=1500" --source "Desk Lamp=800"
//!
//! # Replay recorded tool calls (one JSON object per line) in a fresh session
//! cat calls.jsonl | spatial replay --format json
//! ```
//!
//! ## Exit Codes
//!
//! - 0: Success / PASS
//! - 1: FAIL (compliance) or at least one replayed call failed
//! - 3: Error

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use spatial_core::{
    check_health_compliance, consumption_comparison, cost_timeline, floor_distribution,
    optimization_report, point_illuminance, roi_and_savings, FloorDistribution, Payback,
    RetrofitParams, Room, DEFAULT_HALF_EXTENT_M, DEFAULT_RESOLUTION,
};
use spatial_runtime::{RuntimeConfig, SpatialRuntime, ToolCall};

/// Spatial: lighting physics and retrofit economics
#[derive(Parser)]
#[command(name = "spatial")]
#[command(author = "Spatial Engine Contributors")]
#[command(version)]
#[command(about = "Illuminance, lighting compliance and LED retrofit calculations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Runtime configuration file (YAML); supplies defaults for omitted options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Illuminance directly below a light source
    Lux {
        /// Luminous flux in lumens
        #[arg(long)]
        lumens: f64,

        /// Distance to the surface in meters
        #[arg(long)]
        distance: f64,

        /// Full beam angle in degrees
        #[arg(long)]
        angle: Option<f64>,
    },

    /// Sampled floor illuminance under one luminaire
    Distribution {
        #[arg(long)]
        lumens: f64,

        /// Mounting height above the floor in meters
        #[arg(long)]
        height: f64,

        #[arg(long)]
        angle: Option<f64>,

        /// Half-width of the sampled square in meters
        #[arg(long, default_value_t = DEFAULT_HALF_EXTENT_M)]
        extent: f64,

        /// Samples per axis
        #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
        resolution: usize,
    },

    /// Compare installed lumens against a target lux level
    Optimize {
        /// Floor area in square meters
        #[arg(long)]
        area: f64,

        #[arg(long)]
        target_lux: u32,

        #[arg(long)]
        current_lumens: f64,
    },

    /// Savings, CO2 reduction and payback of a bulb replacement
    Roi {
        #[arg(long)]
        old_watts: f64,

        #[arg(long)]
        new_watts: f64,

        /// Price of one replacement bulb in USD
        #[arg(long, default_value_t = 0.0)]
        price: f64,

        /// Daily usage in hours
        #[arg(long)]
        hours: Option<f64>,

        /// Electricity tariff in USD per kWh
        #[arg(long)]
        rate: Option<f64>,

        /// Number of bulbs replaced
        #[arg(long, default_value_t = 1)]
        count: u32,

        /// Also print a cumulative cost timeline over this many months
        #[arg(long)]
        timeline_months: Option<u32>,
    },

    /// Check a lux level against the health standard for a room type
    Compliance {
        #[arg(long)]
        lux: f64,

        #[arg(long)]
        room_type: Option<String>,
    },

    /// Build a room from its light sources and report its light level
    Room {
        #[arg(long)]
        area: f64,

        /// Wall reflection factor (0-1)
        #[arg(long)]
        reflection: Option<f64>,

        /// Light source as NAME=LUMENS (can be specified multiple times)
        #[arg(long = "source", value_parser = parse_source)]
        sources: Vec<(String, f64)>,
    },

    /// Print the agent tool definitions as JSON
    Tools,

    /// Replay JSON-lines tool calls in one fresh session
    Replay {
        /// File of tool calls (reads from stdin if not provided)
        #[arg(long)]
        calls: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Parse `NAME=LUMENS`. The last `=` separates the two, so names may contain `=`.
fn parse_source(s: &str) -> Result<(String, f64), String> {
    let (name, lumens) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("Invalid source '{}'. Expected NAME=LUMENS (e.g., \"Desk Lamp=800\")", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid source '{}': name is empty", s));
    }
    let lumens = lumens
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid lumens in '{}': {}", s, e))?;
    Ok((name.to_string(), lumens))
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(3)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => RuntimeConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Commands::Lux {
            lumens,
            distance,
            angle,
        } => {
            let angle = angle.unwrap_or(config.defaults.beam_angle_deg);
            let lux = point_illuminance(lumens, distance, angle).context("Illuminance calculation failed")?;
            emit(format, &json!({ "lux": lux }), || {
                println!("{} lux at {} m ({} lm, {}° beam)", lux, distance, lumens, angle);
            })?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Distribution {
            lumens,
            height,
            angle,
            extent,
            resolution,
        } => {
            let angle = angle.unwrap_or(config.defaults.beam_angle_deg);
            let grid = floor_distribution(lumens, height, angle, extent, resolution)
                .context("Floor distribution failed")?;
            emit(format, &grid, || print_distribution(&grid))?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Optimize {
            area,
            target_lux,
            current_lumens,
        } => {
            let report = optimization_report(area, target_lux, current_lumens)
                .context("Optimization report failed")?;
            emit(format, &report, || {
                println!("{}", report.status.as_str());
                println!();
                println!("Average: {} lux (target {} lux over {} sqm)", report.current_lux_avg, report.target_lux, report.room_area);
                println!("Deficiency: {} lm", report.deficiency_lumens);
                println!();
                println!("{}", report.recommendation);
            })?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Roi {
            old_watts,
            new_watts,
            price,
            hours,
            rate,
            count,
            timeline_months,
        } => {
            let params = RetrofitParams::new(old_watts, new_watts)
                .with_price(price)
                .with_hours(hours.unwrap_or(config.defaults.hours_per_day))
                .with_tariff(rate.unwrap_or(config.defaults.kwh_cost_usd))
                .with_count(count);
            roi_command(&params, timeline_months, format)
        }

        Commands::Compliance { lux, room_type } => {
            let room_type = room_type.unwrap_or_else(|| config.defaults.room_type.clone());
            let verdict = check_health_compliance(lux, &room_type).context("Compliance check failed")?;
            emit(format, &verdict, || println!("{}", verdict))?;
            Ok(if verdict.pass {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }

        Commands::Room {
            area,
            reflection,
            sources,
        } => {
            let reflection = reflection.unwrap_or(config.defaults.wall_reflection);
            let mut room = Room::with_parameters(area, reflection).context("Invalid room parameters")?;
            for (name, lumens) in &sources {
                room.add_light_source(name.as_str(), *lumens)
                    .with_context(|| format!("Failed to add source '{}'", name))?;
            }
            let summary = room.summary();
            emit(format, &summary, || println!("{}", summary))?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Tools => {
            let runtime = SpatialRuntime::new(config).context("Failed to start runtime")?;
            println!("{}", serde_json::to_string_pretty(runtime.definitions())?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Replay { calls } => replay_command(config, calls, format),
    }
}

/// Print `value` as JSON, or run the text renderer.
fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce()) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
        }
        OutputFormat::Text => text(),
    }
    Ok(())
}

fn print_distribution(grid: &FloorDistribution) {
    println!(
        "Floor illuminance: {} lm at {} m, {}° beam",
        grid.lumens, grid.mount_height_m, grid.beam_angle_deg
    );
    println!();
    println!("Centre: {:.2} lux", grid.centre_lux());
    println!("Peak: {:.2} lux", grid.max_lux);
    println!("Mean: {:.2} lux", grid.mean_lux);
    println!();

    // Profile along the row through the floor origin, at most 11 samples.
    let n = grid.resolution();
    let row = grid
        .axis
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let stride = ((n - 1) / 10).max(1);
    println!("Profile (x m: lux):");
    for col in (0..n).step_by(stride) {
        if let Some(lux) = grid.at(row, col) {
            println!("  {:>6.2}: {:.2}", grid.axis[col], lux);
        }
    }
}

fn roi_command(params: &RetrofitParams, timeline_months: Option<u32>, format: OutputFormat) -> Result<ExitCode> {
    let roi = roi_and_savings(params).context("ROI calculation failed")?;
    let consumption = consumption_comparison(params).context("Consumption comparison failed")?;
    let timeline = timeline_months
        .map(|months| cost_timeline(params, months))
        .transpose()
        .context("Cost timeline failed")?;

    match format {
        OutputFormat::Json => {
            let json = json!({
                "roi": roi,
                "consumption": consumption,
                "timeline": timeline,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("{}", roi.message);
            println!();
            println!("Energy saved: {} kWh/year", roi.kwh_saved_year);
            println!("Annual savings: ${}", roi.annual_savings_usd);
            println!("CO2 reduction: {} kg/year", roi.co2_reduction_kg);
            println!("Investment: ${} ({} bulbs)", roi.total_investment, roi.lamp_count);
            match roi.payback {
                Payback::Months { months } => println!("Payback: {} months", months),
                Payback::NoInvestmentNeeded => println!("Payback: immediate (no upfront investment)"),
                Payback::NeverRecovers => println!("Payback: never (no energy saved)"),
            }
            println!();
            println!(
                "Consumption: {} kWh/year before, {} kWh/year after",
                consumption.before_kwh_year, consumption.after_kwh_year
            );

            if let Some(timeline) = &timeline {
                println!();
                println!("Cumulative cost (month: legacy / upgrade):");
                for point in timeline.points.iter().filter(|p| p.month % 6 == 0) {
                    println!("  {:>3}: ${:.2} / ${:.2}", point.month, point.legacy_cost, point.upgrade_cost);
                }
                match timeline.payback_month {
                    Some(month) => println!("Upgrade is cheaper from month {}", month),
                    None => println!("Upgrade does not pay back within {} months", timeline.points.len().saturating_sub(1)),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn replay_command(config: RuntimeConfig, calls_path: Option<PathBuf>, format: OutputFormat) -> Result<ExitCode> {
    let reader: Box<dyn BufRead> = match &calls_path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open calls from {:?}", path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let runtime = SpatialRuntime::new(config).context("Failed to start runtime")?;
    let session = runtime.open_session();
    debug!(session = %session.id(), opened_at = %session.created_at().to_rfc3339(), "replaying tool calls");

    let mut failures = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read tool calls")?;
        if line.trim().is_empty() {
            continue;
        }
        let call: ToolCall = serde_json::from_str(&line)
            .with_context(|| format!("Line {}: not a tool call", index + 1))?;

        let output = runtime.call_lenient(session.id(), &call);
        if output.is_error {
            failures += 1;
        }

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&output)?),
            OutputFormat::Text => {
                println!(">>> {}", output.tool);
                println!("{}", output.text);
                println!();
            }
        }
    }

    runtime.close_session(session.id());

    if failures > 0 {
        eprintln!("{} tool call(s) failed", failures);
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(parse_source("Desk Lamp=800"), Ok(("Desk Lamp".to_string(), 800.0)));
        assert_eq!(parse_source(" Window = 1200.5 "), Ok(("Window".to_string(), 1200.5)));
        assert_eq!(parse_source("a=b=10"), Ok(("a=b".to_string(), 10.0)));
    }

    #[test]
    fn test_parse_source_rejects_malformed() {
        assert!(parse_source("Desk Lamp").is_err());
        assert!(parse_source("=800").is_err());
        assert!(parse_source("Lamp=bright").is_err());
    }

    #[test]
    fn test_cli_parses_room_sources() {
        let cli = Cli::try_parse_from([
            "spatial",
            "room",
            "--area",
            "20",
            "--source",
            "Main Chandelier=1500",
            "--source",
            "Desk Lamp=800",
        ])
        .unwrap();

        match cli.command {
            Commands::Room { area, reflection, sources } => {
                assert_eq!(area, 20.0);
                assert_eq!(reflection, None);
                assert_eq!(sources.len(), 2);
                assert_eq!(sources[1], ("Desk Lamp".to_string(), 800.0));
            }
            _ => panic!("expected room command"),
        }
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["spatial", "lux", "--lumens", "800", "--distance", "1", "--format", "json"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn test_roi_defaults() {
        let cli = Cli::try_parse_from(["spatial", "roi", "--old-watts", "60", "--new-watts", "9"]).unwrap();
        match cli.command {
            Commands::Roi { price, count, hours, timeline_months, .. } => {
                assert_eq!(price, 0.0);
                assert_eq!(count, 1);
                assert_eq!(hours, None);
                assert_eq!(timeline_months, None);
            }
            _ => panic!("expected roi command"),
        }
    }
}
