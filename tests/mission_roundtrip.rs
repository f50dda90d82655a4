//! MissionProject export/import through the workspace.

mod common;

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use node_architect::estimate::{Constraints, Role};
use node_architect::mission::{SCHEMA_TAG, SCHEMA_VERSION, SchemaVersion, to_cot_events, to_geojson};

const BUILDS: &[(&str, &str)] = &[("ridge_relay", "Ridge Relay"), ("lora_sentinel", "LoRa Sentinel")];

fn exported(ws: &node_architect::workspace::Workspace) -> Value {
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp");
    serde_json::to_value(ws.export_project(at, SchemaVersion::V2)).expect("project serializes")
}

#[test]
fn export_has_the_documented_shape() {
    let ws = common::workspace_with_designs("Ridge survey", BUILDS);
    let doc = exported(&ws);

    assert_eq!(doc["schemaVersion"], SCHEMA_VERSION);
    assert_eq!(doc["schema"], SCHEMA_TAG);
    assert_eq!(doc["origin_tool"], "node");
    assert_eq!(doc["generated_at"], "2026-03-01T12:00:00Z");
    assert_eq!(doc["mission"]["name"], "Ridge survey");

    let platforms = doc["platforms"].as_array().expect("platforms");
    assert_eq!(platforms.len(), 2);

    let nodes = doc["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 2);
    let relay = &nodes[0];
    assert_eq!(relay["id"], "node-ridge-relay");
    assert_eq!(relay["power_profile"]["estimated_draw_w"], json!(9.5));
    assert_eq!(relay["power_profile"]["adjusted_runtime_h"], json!(15.16));
    assert_eq!(relay["estimated_runtime_min"], json!(909.5));
    assert_eq!(relay["mesh_hints"][0]["estimated_range_km"], json!(0.45));
    assert_eq!(relay["parts"]["rf_chains"][0]["radio_id"], "alfa-ach");
}

#[test]
fn round_trip_preserves_nodes_and_unknown_fields() {
    let mut source = common::workspace_with_designs("Ridge survey", BUILDS);
    source.set_constraints(Constraints {
        max_weight_kg: Some(2.0),
        min_runtime_hours: Some(8.0),
        required_roles: BTreeSet::from([Role::Relay]),
    });

    let mut doc = exported(&source);
    doc["planner_layers"] = json!(["terrain"]);
    doc["nodes"][0]["vendor_ext"] = json!({"mount": "mast", "height_m": 4});
    doc["environment"]["terrain"] = json!("mountain");
    doc["nodes"][0]["environment"]["canopy"] = json!("dense");
    doc["nodes"][0]["capabilities"] = Value::Null;
    doc["nodes"][0]["parts"]["sensor_ids"] = Value::Null;

    let mut target = common::workspace("scratch");
    let warnings = target.import_project(&doc).expect("import should succeed");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

    assert_eq!(target.mission().name, "Ridge survey");
    assert_eq!(target.constraints(), source.constraints());
    assert_eq!(target.designs().len(), source.designs().len());
    for (before, after) in source.designs().iter().zip(target.designs()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.roles, after.roles);
        assert_eq!(before.capabilities, after.capabilities);
        assert_eq!(before.recommended_role, after.recommended_role);
        assert!((before.runtime.adjusted_runtime_hours - after.runtime.adjusted_runtime_hours).abs() <= 0.01);
    }
    assert_eq!(
        target.designs()[0].passthrough.get("vendor_ext"),
        Some(&json!({"mount": "mast", "height_m": 4}))
    );

    let again = exported(&target);
    assert_eq!(again["planner_layers"], json!(["terrain"]));
    assert_eq!(again["nodes"][0]["vendor_ext"]["mount"], "mast");
    assert_eq!(again["environment"]["terrain"], "mountain");
    assert_eq!(again["nodes"][0]["environment"]["canopy"], "dense");
    assert!(again["nodes"][0].get("canopy").is_none());
}

#[test]
fn legacy_document_imports_with_fallbacks() {
    let raw = std::fs::read_to_string(common::fixture("legacy_project.json")).expect("fixture readable");
    let doc = node_architect::mission::parse_document(&raw).expect("fixture is an object");

    let mut ws = common::workspace("scratch");
    let warnings = ws.import_project(&doc).expect("one node should survive");

    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("node-ghost"));
    assert!(warnings[0].contains("unknown host"));

    assert_eq!(ws.designs().len(), 1);
    let relay = &ws.designs()[0];
    assert_eq!(relay.id, "node-ridge-relay");
    assert!((relay.runtime.adjusted_runtime_hours - 10.0).abs() < 1e-9);
    assert_eq!(relay.roles, BTreeSet::from([Role::Relay]));
    assert_eq!(relay.passthrough.get("planner_tag"), Some(&json!({"color": "orange"})));
    assert_eq!(ws.constraints().max_weight_kg, Some(2.0));
    assert_eq!(ws.mission().ao.as_deref(), Some("Ridge North"));

    let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single().expect("valid timestamp");
    let out = serde_json::to_value(ws.export_project(at, SchemaVersion::V2)).expect("serializes");
    assert_eq!(out["schemaVersion"], SCHEMA_VERSION);
    assert_eq!(out["mission"]["classification"], "exercise");
    assert_eq!(out["planner_layers"], json!(["terrain", "hydrology"]));
    assert_eq!(out["kits"][0]["id"], "kit-alpha");
    assert_eq!(out["mesh_links"].as_array().map(Vec::len), Some(1));
    let terrain = out["constraints"]
        .as_array()
        .expect("constraints")
        .iter()
        .find(|c| c["id"] == "c-terrain");
    assert_eq!(terrain.map(|c| &c["value"]), Some(&json!("alpine")));
}

#[test]
fn import_with_no_usable_nodes_leaves_workspace_untouched() {
    let mut ws = common::workspace_with_designs("Ridge survey", BUILDS);
    let doc = json!({
        "schemaVersion": "2.0.0",
        "nodes": [{"id": "node-x", "host_type": {"id": "missing"}}]
    });

    let err = ws.import_project(&doc).expect_err("nothing resolves");
    assert!(err.to_string().contains("no usable nodes"));
    assert_eq!(ws.designs().len(), 2);
    assert_eq!(ws.mission().name, "Ridge survey");
}

#[test]
fn legacy_export_drops_schema_version() {
    let ws = common::workspace_with_designs("Ridge survey", BUILDS);
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single().expect("valid timestamp");
    let doc = serde_json::to_value(ws.export_project(at, SchemaVersion::LegacyV1)).expect("serializes");
    assert!(doc.get("schemaVersion").is_none());
    assert_eq!(doc["schema"], "mission_project_v1");
}

#[test]
fn exported_nodes_render_on_a_map() {
    let ws = common::workspace_with_designs("Ridge survey", BUILDS);
    let doc = exported(&ws);

    let geo = to_geojson(&doc);
    let features = geo["features"].as_array().expect("features");
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["geometry"]["coordinates"], json!([-121.76, 46.85, 1800.0]));
    assert_eq!(features[0]["properties"]["runtime_h"], json!(15.16));

    let events = to_cot_events(&doc);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].uid, "node-lora-sentinel");
    assert!(events[1].remarks.contains("915mhz"));
}
