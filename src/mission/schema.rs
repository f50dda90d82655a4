//! MissionProject wire types.
//!
//! Field names follow the shared MissionProject v2.0.0 layout. Every type
//! that can carry fields from other tools has a flattened extension bag, so
//! unknown keys are kept verbatim and re-emitted on serialization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

use crate::estimate::types::null_as_default;
use crate::estimate::{Constraints, EnvironmentProfile, Location, Role};

pub const SCHEMA_VERSION: &str = "2.0.0";
pub const SCHEMA_TAG: &str = "mission_project_v2";
pub const LEGACY_SCHEMA_TAG: &str = "mission_project_v1";

/// Document-level keys this crate interprets. Anything else is an extra.
pub const DOCUMENT_KEYS: &[&str] = &[
    "schemaVersion",
    "schema",
    "origin_tool",
    "generated_at",
    "mission",
    "environment",
    "constraints",
    "platforms",
    "nodes",
    "mesh_links",
    "kits",
];

/// Which schema layout an export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    #[default]
    V2,
    /// Deprecated `mission_project_v1` tag without `schemaVersion`.
    LegacyV1,
}

/// A complete MissionProject document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionProject {
    #[serde(rename = "schemaVersion", skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub schema: String,
    pub origin_tool: String,
    pub generated_at: String,
    pub mission: Mission,
    pub environment: EnvironmentProfile,
    pub constraints: Vec<Value>,
    pub platforms: Vec<Platform>,
    pub nodes: Vec<NodeEntry>,
    pub mesh_links: Vec<Value>,
    pub kits: Vec<Value>,
    /// Unknown document fields captured at import.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// Mission descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mission {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Mission {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One constraint in the document's `constraints` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

/// Converts active constraints into document entries.
pub fn constraint_entries(constraints: &Constraints) -> Vec<ConstraintEntry> {
    let mut entries = Vec::new();
    if let Some(max) = constraints.max_weight_kg {
        entries.push(ConstraintEntry {
            id: "constraint-max-weight".to_string(),
            kind: "max_weight_kg".to_string(),
            value: json!(max),
        });
    }
    if let Some(min) = constraints.min_runtime_hours {
        entries.push(ConstraintEntry {
            id: "constraint-min-runtime".to_string(),
            kind: "min_runtime_hours".to_string(),
            value: json!(min),
        });
    }
    if !constraints.required_roles.is_empty() {
        let roles: Vec<&str> = constraints.required_roles.iter().map(Role::as_str).collect();
        entries.push(ConstraintEntry {
            id: "constraint-required-roles".to_string(),
            kind: "required_roles".to_string(),
            value: json!(roles),
        });
    }
    entries
}

/// Folds document constraint entries into active constraints.
///
/// Returns the constraints and the raw entries that were not understood,
/// which the caller keeps for re-export.
pub fn constraints_from_entries(raw: &[Value]) -> (Constraints, Vec<Value>) {
    let mut constraints = Constraints::default();
    let mut unrecognized = Vec::new();
    for value in raw {
        let Ok(entry) = serde_json::from_value::<ConstraintEntry>(value.clone()) else {
            unrecognized.push(value.clone());
            continue;
        };
        match (entry.kind.as_str(), &entry.value) {
            ("max_weight_kg", v) if v.as_f64().is_some() => constraints.max_weight_kg = v.as_f64(),
            ("min_runtime_hours", v) if v.as_f64().is_some() => {
                constraints.min_runtime_hours = v.as_f64();
            }
            ("required_roles", Value::Array(roles)) => constraints
                .required_roles
                .extend(roles.iter().filter_map(Value::as_str).map(Role::from)),
            _ => unrecognized.push(value.clone()),
        }
    }
    (constraints, unrecognized)
}

/// A compute platform derived from a host catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub role: String,
    pub origin_tool: String,
    pub specs: PlatformSpecs,
}

/// Static host specifications carried on a platform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlatformSpecs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_idle_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_load_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rf_chains: Option<u32>,
}

/// Platform id for a compute host id.
pub fn platform_id(compute_id: &str) -> String {
    format!("platform-{compute_id}")
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadioSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub radio_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AntennaSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_dbi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatterySnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_wh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemistry: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", alias = "sensor_type", default, deserialize_with = "null_as_default")]
    pub sensor_type: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Id-only component linkage, kept for older readers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rf_chains: Vec<ChainPartsEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sensor_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainPartsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antenna_id: Option<String>,
}

/// Link planning hint for downstream mesh tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshHint {
    pub band: String,
    pub estimated_range_km: f64,
}

/// Hints are recomputed on export, so entries that do not parse are dropped
/// rather than failing the node.
fn usable_hints<'de, D>(deserializer: D) -> Result<Vec<MeshHint>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|hint| serde_json::from_value(hint).ok())
        .collect())
}

/// One node in the document's `nodes` list.
///
/// All interpreted fields are optional so that partial and older entries
/// still parse; everything else lands in `passthrough`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rf_bands: Vec<String>,
    /// Kept as a raw object; field names vary between schema generations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_profile: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<BatterySnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_assumptions: Option<EnvironmentProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_type: Option<HostSnapshot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub radios: Vec<RadioSnapshot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub antennas: Vec<AntennaSnapshot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sensors: Vec<SensorSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_runtime_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<PartsEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "usable_hints", skip_serializing_if = "Vec::is_empty")]
    pub mesh_hints: Vec<MeshHint>,
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_node_fields_land_in_passthrough() {
        let raw = json!({
            "id": "node-a",
            "roles": ["relay"],
            "vendor_ext": {"color": "red"},
            "priority": 3
        });
        let entry: NodeEntry = serde_json::from_value(raw).expect("entry parses");
        assert_eq!(entry.id.as_deref(), Some("node-a"));
        assert_eq!(entry.passthrough.len(), 2);
        assert_eq!(entry.passthrough.get("priority"), Some(&json!(3)));

        let back = serde_json::to_value(&entry).expect("entry serializes");
        assert_eq!(back["vendor_ext"]["color"], "red");
    }

    #[test]
    fn null_lists_read_as_empty() {
        let raw = json!({
            "id": "node-a",
            "roles": null,
            "capabilities": null,
            "rf_bands": null,
            "radios": [{"id": "alfa", "name": null, "bands": null}],
            "sensors": null,
            "mesh_hints": [null, {"band": "2.4ghz", "estimated_range_km": 0.45}],
            "parts": {"host_id": "pi5", "rf_chains": null, "sensor_ids": null}
        });
        let entry: NodeEntry = serde_json::from_value(raw).expect("entry parses");
        assert!(entry.capabilities.is_empty());
        assert!(entry.roles.is_empty());
        assert_eq!(entry.radios[0].id, "alfa");
        assert!(entry.radios[0].bands.is_empty());
        assert_eq!(entry.mesh_hints.len(), 1);
        let parts = entry.parts.expect("parts kept");
        assert!(parts.rf_chains.is_empty());
        assert!(parts.sensor_ids.is_empty());
        assert!(entry.passthrough.is_empty());
    }

    #[test]
    fn constraint_entries_round_trip() {
        let constraints = Constraints {
            max_weight_kg: Some(2.5),
            min_runtime_hours: Some(6.0),
            required_roles: [Role::Relay, Role::Other("mesh-anchor".into())].into_iter().collect(),
        };
        let raw: Vec<Value> = constraint_entries(&constraints)
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect();
        let (back, unrecognized) = constraints_from_entries(&raw);
        assert_eq!(back, constraints);
        assert!(unrecognized.is_empty());
    }

    #[test]
    fn unknown_constraint_types_are_kept_aside() {
        let raw = vec![
            json!({"id": "c1", "type": "max_cost_usd", "value": 400}),
            json!("not an object"),
        ];
        let (constraints, unrecognized) = constraints_from_entries(&raw);
        assert!(constraints.is_empty());
        assert_eq!(unrecognized.len(), 2);
    }
}
