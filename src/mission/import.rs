//! Reading MissionProject documents back into designs.
//!
//! Import is per node: a node whose parts cannot be resolved against the
//! catalog is dropped with a warning and the rest still import. Only a
//! document that yields no node at all is rejected.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};

use super::export::ProjectExtras;
use super::ids::IdAllocator;
use super::profile::PowerProfile;
use super::schema::{DOCUMENT_KEYS, LEGACY_SCHEMA_TAG, Mission, NodeEntry, constraints_from_entries};
use crate::catalog::Catalog;
use crate::design::NodeDesign;
use crate::error::ImportError;
use crate::estimate::{
    Constraints, EnvironmentProfile, FactorTables, NodeConfig, RfChain, Role, evaluate,
};

/// Designs and document context recovered from an import.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub designs: Vec<NodeDesign>,
    /// One entry per skipped node, chain or sensor.
    pub warnings: Vec<String>,
    pub mission: Mission,
    /// The document environment over the caller's defaults; `None` when the
    /// document has none.
    pub environment: Option<EnvironmentProfile>,
    pub constraints: Constraints,
    pub extras: ProjectExtras,
}

/// Parses raw text into a document object.
///
/// # Errors
///
/// `ImportError::Malformed` when the text is not JSON or not an object.
pub fn parse_document(raw: &str) -> Result<Value, ImportError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ImportError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(ImportError::Malformed("top level is not an object".into()));
    }
    Ok(value)
}

/// Node part ids gathered from `parts` or, for older documents, from the
/// component snapshots.
struct PartIds {
    host: Option<String>,
    battery: Option<String>,
    chains: Vec<(Option<String>, Option<String>)>,
    sensors: Vec<String>,
}

impl PartIds {
    fn from_entry(entry: &NodeEntry) -> Self {
        let parts = entry.parts.clone().unwrap_or_default();
        let snapshot_id = |id: &String| Some(id.clone()).filter(|s| !s.is_empty());

        let host = parts
            .host_id
            .or_else(|| entry.host_type.as_ref().and_then(|h| snapshot_id(&h.id)));
        let battery = parts
            .battery_id
            .or_else(|| entry.battery.as_ref().and_then(|b| snapshot_id(&b.id)));
        let chains = if parts.rf_chains.is_empty() {
            (0..entry.radios.len().max(entry.antennas.len()))
                .map(|i| {
                    (
                        entry.radios.get(i).and_then(|r| snapshot_id(&r.id)),
                        entry.antennas.get(i).and_then(|a| snapshot_id(&a.id)),
                    )
                })
                .collect()
        } else {
            parts
                .rf_chains
                .into_iter()
                .map(|c| (c.radio_id, c.antenna_id))
                .collect()
        };
        let sensors = if parts.sensor_ids.is_empty() {
            entry.sensors.iter().filter_map(|s| snapshot_id(&s.id)).collect()
        } else {
            parts.sensor_ids
        };
        Self {
            host,
            battery,
            chains,
            sensors,
        }
    }
}

/// Imports every resolvable node of `doc`.
///
/// Labels the document leaves out are taken from `defaults`. Document-level fields outside the known key set are returned in
/// `extras.fields`; node-level unknown fields travel on each design's
/// `passthrough`.
///
/// # Errors
///
/// `ImportError::Malformed` when `doc` is not an object or `nodes` is not an
/// array; `ImportError::NoUsableNodes` when no node resolves.
pub fn import_project(
    doc: &Value,
    catalog: &Catalog,
    tables: &FactorTables,
    defaults: &EnvironmentProfile,
    ids: &mut IdAllocator,
) -> Result<ImportOutcome, ImportError> {
    let Value::Object(root) = doc else {
        return Err(ImportError::Malformed("top level is not an object".into()));
    };
    let mut warnings = Vec::new();

    let schema = root.get("schema").and_then(Value::as_str).unwrap_or("");
    if schema == LEGACY_SCHEMA_TAG || !root.contains_key("schemaVersion") {
        tracing::debug!(schema, "reading MissionProject with legacy fallbacks");
    }

    let mission = match root.get("mission") {
        None | Some(Value::Null) => Mission::default(),
        Some(Value::String(name)) => Mission::named(name.clone()),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warnings.push(format!("mission descriptor ignored: {e}"));
            Mission::default()
        }),
    };
    let environment = match root.get("environment") {
        None | Some(Value::Null) => None,
        Some(value) => match defaults.overlaid_with(value) {
            Ok(environment) => Some(environment),
            Err(e) => {
                warnings.push(format!("document environment ignored: {e}"));
                None
            }
        },
    };
    let node_default = environment.clone().unwrap_or_else(|| defaults.clone());
    let (constraints, unrecognized_constraints) =
        constraints_from_entries(array(root, "constraints"));

    let extras = ProjectExtras {
        fields: root
            .iter()
            .filter(|(key, _)| !DOCUMENT_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        mesh_links: array(root, "mesh_links").to_vec(),
        kits: array(root, "kits").to_vec(),
        constraints: unrecognized_constraints,
    };

    let nodes = match root.get("nodes") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(nodes)) => nodes.as_slice(),
        Some(_) => return Err(ImportError::Malformed("\"nodes\" is not an array".into())),
    };

    let mut designs: Vec<NodeDesign> = Vec::new();
    let mut seen = HashSet::new();
    for (index, raw) in nodes.iter().enumerate() {
        let entry: NodeEntry = match serde_json::from_value(raw.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                warnings.push(format!("node #{index} skipped: {e}"));
                continue;
            }
        };
        let Some(mut design) = import_node(
            &entry,
            index,
            catalog,
            tables,
            &node_default,
            ids,
            &mut warnings,
        ) else {
            continue;
        };
        if !seen.insert(design.id.clone()) {
            warnings.push(format!("node {} skipped: duplicate id", design.id));
            continue;
        }
        design.mission = mission.name.clone();
        designs.push(design);
    }

    if designs.is_empty() {
        if nodes.is_empty() {
            warnings.push("document has no nodes".to_string());
        }
        tracing::warn!(warnings = warnings.len(), "mission project import yielded no nodes");
        return Err(ImportError::NoUsableNodes { warnings });
    }

    tracing::info!(
        imported = designs.len(),
        skipped = nodes.len() - designs.len(),
        warnings = warnings.len(),
        "mission project imported"
    );

    Ok(ImportOutcome {
        designs,
        warnings,
        mission,
        environment,
        constraints,
        extras,
    })
}

fn array<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn import_node(
    entry: &NodeEntry,
    index: usize,
    catalog: &Catalog,
    tables: &FactorTables,
    document_environment: &EnvironmentProfile,
    ids: &mut IdAllocator,
    warnings: &mut Vec<String>,
) -> Option<NodeDesign> {
    let label = match entry.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("#{index}"),
    };
    let part_ids = PartIds::from_entry(entry);

    let Some(compute) = part_ids.host.as_deref().and_then(|id| catalog.compute(id)) else {
        warnings.push(format!(
            "node {label} skipped: unknown host \"{}\"",
            part_ids.host.as_deref().unwrap_or("")
        ));
        return None;
    };
    let Some(battery) = part_ids.battery.as_deref().and_then(|id| catalog.battery(id)) else {
        warnings.push(format!(
            "node {label} skipped: unknown battery \"{}\"",
            part_ids.battery.as_deref().unwrap_or("")
        ));
        return None;
    };

    let mut chains = Vec::new();
    for (position, (radio_id, antenna_id)) in part_ids.chains.iter().enumerate() {
        let radio = radio_id.as_deref().and_then(|id| catalog.radio(id));
        let antenna = antenna_id.as_deref().and_then(|id| catalog.antenna(id));
        match (radio, antenna) {
            (Some(radio), Some(antenna)) => chains.push(RfChain {
                radio: radio.clone(),
                antenna: antenna.clone(),
            }),
            _ if position == 0 => {
                warnings.push(format!(
                    "node {label} skipped: unknown primary radio \"{}\" or antenna \"{}\"",
                    radio_id.as_deref().unwrap_or(""),
                    antenna_id.as_deref().unwrap_or("")
                ));
                return None;
            }
            _ => warnings.push(format!("node {label}: RF chain {position} dropped, unknown part")),
        }
    }
    if chains.is_empty() {
        warnings.push(format!("node {label} skipped: no RF chain"));
        return None;
    }

    let mut sensors = Vec::new();
    for id in &part_ids.sensors {
        match catalog.sensor(id) {
            Some(sensor) => sensors.push(sensor.clone()),
            None => warnings.push(format!("node {label}: unknown sensor \"{id}\" ignored")),
        }
    }

    let environment = entry
        .environment
        .clone()
        .or_else(|| entry.environment_assumptions.clone())
        .unwrap_or_else(|| document_environment.clone());

    let config = NodeConfig {
        compute: compute.clone(),
        battery: battery.clone(),
        chains,
        sensors,
        environment,
        location: entry.location,
    };
    let result = match evaluate(&config, tables) {
        Ok(result) => result,
        Err(e) => {
            warnings.push(format!("node {label} skipped: {e}"));
            return None;
        }
    };

    let name = entry
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| label.clone());
    let id = match entry.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ids.id_for_name(entry.name.as_deref().unwrap_or("")),
    };
    let roles: BTreeSet<Role> = entry.roles.iter().map(|r| Role::from(r.as_str())).collect();

    let mut design = NodeDesign::from_evaluation(id, name, &config, &result, roles);
    design.runtime = PowerProfile::resolve(entry.power_profile.as_ref(), entry.estimated_runtime_min)
        .backfill(&result.runtime);
    if let Some(role) = entry.recommended_role.as_ref().filter(|r| !r.is_empty()) {
        design.recommended_role = role.clone();
    }
    if let Some(origin) = entry.origin_tool.as_ref().filter(|o| !o.is_empty()) {
        design.origin_tool = origin.clone();
    }
    design.notes = entry.notes.clone().unwrap_or_default();
    design.passthrough = entry.passthrough.clone();
    Some(design)
}
