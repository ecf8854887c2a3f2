//! Configuration for spatial-runtime.
//!
//! Every field has a serde default, so an empty YAML document is a valid
//! configuration.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use spatial_core::{
    guard, DEFAULT_BEAM_ANGLE_DEG, DEFAULT_HOURS_PER_DAY, DEFAULT_KWH_COST_USD, DEFAULT_ROOM_TYPE,
    DEFAULT_WALL_REFLECTION,
};

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Session store limits
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Values used when a tool call omits an optional argument
    #[serde(default)]
    pub defaults: ToolDefaults,
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Defaults must pass the same checks the engine applies to tool input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.max_sessions must be at least 1".to_string(),
            ));
        }
        if self.sessions.idle_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "sessions.idle_timeout must be greater than zero".to_string(),
            ));
        }

        let d = &self.defaults;
        let checks = [
            guard::beam_angle("defaults.beam_angle_deg", d.beam_angle_deg),
            guard::in_range("defaults.hours_per_day", d.hours_per_day, 0.0, 24.0),
            guard::non_negative("defaults.kwh_cost_usd", d.kwh_cost_usd),
            guard::unit_interval("defaults.wall_reflection", d.wall_reflection),
        ];
        for check in checks {
            check.map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        if d.room_type.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "defaults.room_type must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Maximum number of live sessions; the least recently used are evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,

    /// Sessions untouched for this long are dropped
    #[serde(
        default = "default_idle_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub idle_timeout: Duration,
}

fn default_max_sessions() -> u64 {
    1000
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout: default_idle_timeout(),
        }
    }
}

/// Fallback values for optional tool arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefaults {
    #[serde(default = "default_beam_angle")]
    pub beam_angle_deg: f64,

    #[serde(default = "default_hours")]
    pub hours_per_day: f64,

    #[serde(default = "default_tariff")]
    pub kwh_cost_usd: f64,

    #[serde(default = "default_room_type")]
    pub room_type: String,

    /// Wall reflection of a freshly created session room
    #[serde(default = "default_wall_reflection")]
    pub wall_reflection: f64,
}

fn default_beam_angle() -> f64 {
    DEFAULT_BEAM_ANGLE_DEG
}

fn default_hours() -> f64 {
    DEFAULT_HOURS_PER_DAY
}

fn default_tariff() -> f64 {
    DEFAULT_KWH_COST_USD
}

fn default_room_type() -> String {
    DEFAULT_ROOM_TYPE.to_string()
}

fn default_wall_reflection() -> f64 {
    DEFAULT_WALL_REFLECTION
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            beam_angle_deg: default_beam_angle(),
            hours_per_day: default_hours(),
            kwh_cost_usd: default_tariff(),
            room_type: default_room_type(),
            wall_reflection: default_wall_reflection(),
        }
    }
}

fn serialize_duration<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RuntimeConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.sessions.max_sessions, 1000);
        assert_eq!(config.sessions.idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.defaults.kwh_cost_usd, 0.17);
        assert_eq!(config.defaults.room_type, "office");
    }

    #[test]
    fn test_partial_override() {
        let config = RuntimeConfig::from_yaml(
            r#"
sessions:
  idle_timeout: 5m
defaults:
  kwh_cost_usd: 0.25
  room_type: kitchen
"#,
        )
        .unwrap();

        assert_eq!(config.sessions.idle_timeout, Duration::from_secs(300));
        assert_eq!(config.sessions.max_sessions, 1000);
        assert_eq!(config.defaults.kwh_cost_usd, 0.25);
        assert_eq!(config.defaults.hours_per_day, 5.0);
        assert_eq!(config.defaults.room_type, "kitchen");
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = RuntimeConfig::from_yaml("sessions:\n  idle_timeout: soon\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_out_of_range_default_rejected() {
        let result = RuntimeConfig::from_yaml("defaults:\n  wall_reflection: 1.5\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let result = RuntimeConfig::from_yaml("defaults:\n  beam_angle_deg: 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_sessions_rejected() {
        let result = RuntimeConfig::from_yaml("sessions:\n  max_sessions: 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&RuntimeConfig::default()).unwrap();
        assert!(yaml.contains("idle_timeout: 30m"));
        assert_eq!(RuntimeConfig::from_yaml(&yaml).unwrap(), RuntimeConfig::default());
    }
}
