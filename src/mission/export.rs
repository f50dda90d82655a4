//! Building a MissionProject document from saved designs.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::profile::{profile_object, round1, round2};
use super::schema::{
    AntennaSnapshot, BatterySnapshot, ChainPartsEntry, HostSnapshot, LEGACY_SCHEMA_TAG, MeshHint,
    Mission, MissionProject, NodeEntry, PartsEntry, Platform, PlatformSpecs, RadioSnapshot,
    SCHEMA_TAG, SCHEMA_VERSION, SchemaVersion, SensorSnapshot, constraint_entries, platform_id,
};
use crate::catalog::Compute;
use crate::design::{NodeDesign, ORIGIN_TOOL};
use crate::estimate::{Constraints, EnvironmentProfile, Role};

/// Document content that is carried through rather than computed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectExtras {
    /// Unknown document-level fields, in their original order.
    pub fields: Map<String, Value>,
    pub mesh_links: Vec<Value>,
    pub kits: Vec<Value>,
    /// Constraint entries of a type this tool does not evaluate.
    pub constraints: Vec<Value>,
}

impl ProjectExtras {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.mesh_links.is_empty()
            && self.kits.is_empty()
            && self.constraints.is_empty()
    }
}

/// Everything besides the designs that goes into an export.
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub mission: Mission,
    pub environment: EnvironmentProfile,
    pub constraints: Constraints,
    pub extras: ProjectExtras,
    pub generated_at: DateTime<Utc>,
    pub schema: SchemaVersion,
}

impl ExportContext {
    /// A v2 context with no constraints or carried extras.
    pub fn new(mission: Mission, generated_at: DateTime<Utc>) -> Self {
        Self {
            mission,
            environment: EnvironmentProfile::default(),
            constraints: Constraints::default(),
            extras: ProjectExtras::default(),
            generated_at,
            schema: SchemaVersion::V2,
        }
    }
}

/// Builds the MissionProject document for `designs`.
///
/// Platforms are deduplicated by compute id in first-seen order. Node and
/// document passthrough fields are merged back verbatim.
pub fn export_project(designs: &[NodeDesign], ctx: &ExportContext) -> MissionProject {
    let mut platforms: Vec<Platform> = Vec::new();
    for design in designs {
        let id = platform_id(&design.parts.compute.id);
        if !platforms.iter().any(|p| p.id == id) {
            platforms.push(platform(&design.parts.compute));
        }
    }

    let mut constraints: Vec<Value> = constraint_entries(&ctx.constraints)
        .iter()
        .filter_map(|entry| serde_json::to_value(entry).ok())
        .collect();
    constraints.extend(ctx.extras.constraints.iter().cloned());

    let (schema_version, schema) = match ctx.schema {
        SchemaVersion::V2 => (Some(SCHEMA_VERSION.to_string()), SCHEMA_TAG),
        SchemaVersion::LegacyV1 => (None, LEGACY_SCHEMA_TAG),
    };

    tracing::info!(
        nodes = designs.len(),
        platforms = platforms.len(),
        schema,
        "mission project exported"
    );

    MissionProject {
        schema_version,
        schema: schema.to_string(),
        origin_tool: ORIGIN_TOOL.to_string(),
        generated_at: ctx.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        mission: ctx.mission.clone(),
        environment: ctx.environment.clone(),
        constraints,
        platforms,
        nodes: designs.iter().map(node_entry).collect(),
        mesh_links: ctx.extras.mesh_links.clone(),
        kits: ctx.extras.kits.clone(),
        extras: ctx.extras.fields.clone(),
    }
}

fn platform(compute: &Compute) -> Platform {
    let name = if compute.name.is_empty() {
        compute.id.clone()
    } else {
        compute.name.clone()
    };
    Platform {
        id: platform_id(&compute.id),
        name,
        role: "compute".to_string(),
        origin_tool: ORIGIN_TOOL.to_string(),
        specs: PlatformSpecs {
            cpu: compute.cpu.clone(),
            cpu_score: compute.cpu_score,
            ram_gb: compute.ram_gb,
            storage: compute.storage.clone(),
            power_idle_w: compute.power_w_idle,
            power_load_w: compute.power_w_load,
            weight_kg: compute.weight_kg,
            max_rf_chains: compute.max_rf_chains,
        },
    }
}

fn node_entry(design: &NodeDesign) -> NodeEntry {
    let parts = &design.parts;
    let compute = &parts.compute;
    let battery = &parts.battery;

    let mesh_hints = parts
        .rf_chains
        .iter()
        .zip(&design.ranges)
        .filter_map(|(chain, range)| {
            let meters = range.estimate.range_m?;
            let band = chain
                .radio
                .rf_bands()
                .into_iter()
                .next()
                .unwrap_or_else(|| chain.radio.kind());
            Some(MeshHint {
                band,
                estimated_range_km: round2(f64::from(meters) / 1000.0),
            })
        })
        .collect();

    NodeEntry {
        id: Some(design.id.clone()),
        name: Some(design.name.clone()),
        origin_tool: Some(design.origin_tool.clone()),
        platform_id: Some(platform_id(&compute.id)),
        roles: design.roles.iter().map(Role::as_str).map(str::to_string).collect(),
        rf_bands: design.rf_bands.clone(),
        power_profile: Some(profile_object(&design.runtime)),
        battery: Some(BatterySnapshot {
            id: battery.id.clone(),
            name: battery.name.clone(),
            capacity_wh: battery.capacity_wh,
            chemistry: battery.chemistry.clone(),
            tags: battery.tags.clone(),
        }),
        environment: Some(design.environment.clone()),
        environment_assumptions: Some(design.environment.clone()),
        host_type: Some(HostSnapshot {
            id: compute.id.clone(),
            name: compute.name.clone(),
            tags: compute.tags.clone(),
        }),
        radios: parts
            .rf_chains
            .iter()
            .map(|c| RadioSnapshot {
                id: c.radio.id.clone(),
                name: c.radio.name.clone(),
                radio_type: c.radio.radio_type.clone(),
                bands: c.radio.rf_bands(),
            })
            .collect(),
        antennas: parts
            .rf_chains
            .iter()
            .map(|c| AntennaSnapshot {
                id: c.antenna.id.clone(),
                name: c.antenna.name.clone(),
                gain_dbi: c.antenna.gain_dbi,
                pattern: c.antenna.pattern.clone(),
            })
            .collect(),
        sensors: parts
            .sensors
            .iter()
            .map(|s| SensorSnapshot {
                id: s.id.clone(),
                name: s.name.clone(),
                sensor_type: s.sensor_type.clone(),
                tags: s.tags.clone(),
            })
            .collect(),
        estimated_runtime_min: Some(round1(design.runtime.adjusted_runtime_hours * 60.0)),
        weight_kg: Some(round2(design.weight_kg)),
        capabilities: design.capabilities.iter().cloned().collect(),
        recommended_role: Some(design.recommended_role.clone()),
        parts: Some(PartsEntry {
            host_id: Some(compute.id.clone()),
            battery_id: Some(battery.id.clone()),
            rf_chains: parts
                .rf_chains
                .iter()
                .map(|c| ChainPartsEntry {
                    radio_id: Some(c.radio.id.clone()),
                    antenna_id: Some(c.antenna.id.clone()),
                })
                .collect(),
            sensor_ids: parts.sensors.iter().map(|s| s.id.clone()).collect(),
        }),
        notes: Some(design.notes.clone()),
        location: design.location,
        mesh_hints,
        passthrough: design.passthrough.clone(),
    }
}
