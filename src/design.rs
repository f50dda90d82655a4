//! Saved node designs: the unit that is persisted, exported and imported.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{Battery, Compute, Sensor};
use crate::estimate::{
    ChainRange, ConstraintReport, ConstraintSubject, Constraints, EnvironmentProfile,
    EvaluationResult, Location, NodeConfig, RfChain, Role, RuntimeBreakdown, evaluate_constraints,
};

/// Origin tag written on everything this tool emits.
pub const ORIGIN_TOOL: &str = "node";

/// Component snapshot sufficient to rebuild the node's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParts {
    pub compute: Compute,
    pub battery: Battery,
    pub rf_chains: Vec<RfChain>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

/// A saved, evaluated node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDesign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default = "default_origin")]
    pub origin_tool: String,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    #[serde(default)]
    pub environment: EnvironmentProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub weight_kg: f64,
    pub runtime: RuntimeBreakdown,
    #[serde(default)]
    pub ranges: Vec<ChainRange>,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub recommended_role: String,
    #[serde(default)]
    pub rf_bands: Vec<String>,
    pub parts: DesignParts,
    /// Unrecognized node fields from an imported document, re-emitted verbatim.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub passthrough: Map<String, Value>,
}

fn default_origin() -> String {
    ORIGIN_TOOL.to_string()
}

impl NodeDesign {
    /// Builds a design from a configuration and its evaluation.
    ///
    /// When `roles` is empty the evaluation's suggested roles are used.
    pub fn from_evaluation(
        id: String,
        name: String,
        config: &NodeConfig,
        result: &EvaluationResult,
        roles: BTreeSet<Role>,
    ) -> Self {
        let roles = if roles.is_empty() {
            result.suggested_roles.clone()
        } else {
            roles
        };
        Self {
            id,
            name,
            notes: String::new(),
            mission: String::new(),
            origin_tool: default_origin(),
            roles,
            environment: config.environment.clone(),
            location: config.location,
            weight_kg: result.weight_kg,
            runtime: result.runtime,
            ranges: result.ranges.clone(),
            capabilities: result.capabilities.clone(),
            recommended_role: result.recommended_role.clone(),
            rf_bands: result.rf_bands.clone(),
            parts: DesignParts {
                compute: config.compute.clone(),
                battery: config.battery.clone(),
                rf_chains: config.chains.clone(),
                sensors: config.sensors.clone(),
            },
            passthrough: Map::new(),
        }
    }

    /// Rebuilds the configuration this design was evaluated from.
    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            compute: self.parts.compute.clone(),
            battery: self.parts.battery.clone(),
            chains: self.parts.rf_chains.clone(),
            sensors: self.parts.sensors.clone(),
            environment: self.environment.clone(),
            location: self.location,
        }
    }

    /// Checks the design against mission constraints.
    pub fn check(&self, constraints: &Constraints, with_warnings: bool) -> ConstraintReport {
        let subject = ConstraintSubject {
            weight_kg: self.weight_kg,
            runtime_hours: self.runtime.adjusted_runtime_hours,
            roles: &self.roles,
        };
        evaluate_constraints(&subject, constraints, with_warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Antenna, Radio};
    use crate::estimate::{FactorTables, evaluate};

    fn config() -> NodeConfig {
        NodeConfig {
            compute: Compute {
                id: "pi5".into(),
                power_w_idle: Some(3.0),
                power_w_load: Some(5.0),
                ..Compute::default()
            },
            battery: Battery {
                id: "pack".into(),
                capacity_wh: Some(40.0),
                ..Battery::default()
            },
            chains: vec![RfChain {
                radio: Radio {
                    id: "lora".into(),
                    radio_type: "lora".into(),
                    ..Radio::default()
                },
                antenna: Antenna::default(),
            }],
            sensors: Vec::new(),
            environment: EnvironmentProfile::default(),
            location: None,
        }
    }

    #[test]
    fn empty_roles_fall_back_to_suggestions() {
        let cfg = config();
        let result = evaluate(&cfg, &FactorTables::default()).expect("evaluates");
        let design = NodeDesign::from_evaluation("node-a".into(), "A".into(), &cfg, &result, BTreeSet::new());
        assert!(design.roles.contains(&Role::Telemetry));
        assert_eq!(design.node_config(), cfg);
    }

    #[test]
    fn check_uses_adjusted_runtime() {
        let cfg = config();
        let result = evaluate(&cfg, &FactorTables::default()).expect("evaluates");
        let design = NodeDesign::from_evaluation("node-a".into(), "A".into(), &cfg, &result, BTreeSet::new());
        let constraints = Constraints {
            min_runtime_hours: Some(10.0),
            ..Constraints::default()
        };
        assert!(design.check(&constraints, false).passes);
        let constraints = Constraints {
            min_runtime_hours: Some(10.01),
            ..Constraints::default()
        };
        assert!(!design.check(&constraints, false).passes);
    }
}
