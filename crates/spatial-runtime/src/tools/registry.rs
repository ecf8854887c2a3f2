//! Compiled argument schemas for every tool.

use serde_json::Value;
use std::collections::HashMap;

use super::definitions::{ToolDefinition, ToolKind};
use crate::RuntimeError;

/// Tool declarations plus their compiled JSON Schema validators.
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    validators: HashMap<ToolKind, jsonschema::Validator>,
}

impl ToolRegistry {
    /// Compile the schema of every tool once.
    pub fn new() -> Result<Self, RuntimeError> {
        let mut definitions = Vec::with_capacity(ToolKind::ALL.len());
        let mut validators = HashMap::with_capacity(ToolKind::ALL.len());

        for kind in ToolKind::ALL {
            let definition = kind.definition();
            let validator = jsonschema::options()
                .build(&definition.parameters)
                .map_err(|e| RuntimeError::Schema {
                    tool: kind.to_string(),
                    message: e.to_string(),
                })?;
            validators.insert(kind, validator);
            definitions.push(definition);
        }

        Ok(Self {
            definitions,
            validators,
        })
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Resolve a tool name.
    pub fn lookup(&self, name: &str) -> Result<ToolKind, RuntimeError> {
        name.parse::<ToolKind>()
            .map_err(RuntimeError::UnknownTool)
    }

    /// Validate arguments against the tool's schema.
    ///
    /// Returns every violation, each with the JSON pointer it occurred at.
    pub fn validate(&self, kind: ToolKind, arguments: &Value) -> Result<(), Vec<String>> {
        let Some(validator) = self.validators.get(&kind) else {
            return Err(vec![format!("no schema registered for {}", kind)]);
        };

        let errors: Vec<String> = validator
            .iter_errors(arguments)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{} at {}", e, path)
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_schemas_compile() {
        let registry = ToolRegistry::new().unwrap();
        assert_eq!(registry.definitions().len(), ToolKind::ALL.len());
    }

    #[test]
    fn test_lookup() {
        let registry = ToolRegistry::new().unwrap();
        assert_eq!(
            registry.lookup("check_health_compliance").unwrap(),
            ToolKind::CheckHealthCompliance
        );
        assert!(matches!(
            registry.lookup("order_pizza"),
            Err(RuntimeError::UnknownTool(name)) if name == "order_pizza"
        ));
    }

    #[test]
    fn test_valid_arguments_pass() {
        let registry = ToolRegistry::new().unwrap();
        let args = json!({"light_lumens": 800, "distance_meters": "1.5 m"});
        assert!(registry.validate(ToolKind::CalculateLuxAtPoint, &args).is_ok());
    }

    #[test]
    fn test_missing_required_argument() {
        let registry = ToolRegistry::new().unwrap();
        let errors = registry
            .validate(ToolKind::CalculateLuxAtPoint, &json!({"light_lumens": 800}))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("distance_meters"));
    }

    #[test]
    fn test_unknown_property_rejected() {
        let registry = ToolRegistry::new().unwrap();
        let args = json!({"lux_level": 300, "colour": "warm"});
        assert!(registry.validate(ToolKind::CheckHealthCompliance, &args).is_err());
    }

    #[test]
    fn test_wrong_type_reports_path() {
        let registry = ToolRegistry::new().unwrap();
        let args = json!({"name": "Lamp", "lumens": [800]});
        let errors = registry.validate(ToolKind::AddLightSource, &args).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("/lumens")));
    }

    #[test]
    fn test_all_errors_collected() {
        let registry = ToolRegistry::new().unwrap();
        let errors = registry
            .validate(ToolKind::GenerateOptimizationReport, &json!({}))
            .unwrap_err();
        let joined = errors.join(" ");
        assert!(joined.contains("room_area_sqm"));
        assert!(joined.contains("target_lux"));
        assert!(joined.contains("current_lumens"));
    }
}
