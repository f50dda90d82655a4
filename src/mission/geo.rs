//! Map-facing views of a MissionProject document: GeoJSON and CoT stubs.
//!
//! Both work on the raw document so they apply equally to exports from this
//! tool and to documents written by others.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::design::ORIGIN_TOOL;

/// CoT type for a friendly ground unit.
pub const COT_TYPE: &str = "a-f-G-U-C";
/// CoT `how` for machine-generated positions.
pub const COT_HOW: &str = "m-g";

/// Minimal Cursor-on-Target event for one located node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CotEvent {
    pub uid: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub how: String,
    pub lat: f64,
    pub lon: f64,
    /// Height above ellipsoid (m), when the node carries an elevation.
    pub hae: Option<f64>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub remarks: String,
}

struct Position {
    lat: f64,
    lon: f64,
    elevation_m: Option<f64>,
}

fn position(node: &Value) -> Option<Position> {
    let loc = node.get("location")?;
    Some(Position {
        lat: loc.get("lat")?.as_f64()?,
        lon: loc.get("lon")?.as_f64()?,
        elevation_m: loc.get("elevation_m").and_then(Value::as_f64),
    })
}

fn nodes(doc: &Value) -> &[Value] {
    doc.get("nodes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn origin<'a>(item: &'a Value, doc: &'a Value) -> &'a str {
    item.get("origin_tool")
        .and_then(Value::as_str)
        .or_else(|| doc.get("origin_tool").and_then(Value::as_str))
        .unwrap_or(ORIGIN_TOOL)
}

fn field(item: &Value, key: &str) -> Value {
    item.get(key).cloned().unwrap_or(Value::Null)
}

fn profile_field(node: &Value, key: &str) -> Value {
    node.get("power_profile")
        .and_then(|p| p.get(key))
        .cloned()
        .unwrap_or(Value::Null)
}

/// A FeatureCollection with a Point per located node and a LineString per
/// mesh link whose two ends are both located.
pub fn to_geojson(doc: &Value) -> Value {
    let mut features = Vec::new();
    let mut located: Map<String, Value> = Map::new();

    for node in nodes(doc) {
        let Some(pos) = position(node) else {
            continue;
        };
        let mut coordinates = vec![json!(pos.lon), json!(pos.lat)];
        if let Some(elevation) = pos.elevation_m {
            coordinates.push(json!(elevation));
        }
        if let Some(id) = node.get("id").and_then(Value::as_str) {
            located.insert(id.to_string(), json!(coordinates));
        }
        features.push(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": coordinates},
            "properties": {
                "id": field(node, "id"),
                "name": field(node, "name"),
                "origin_tool": origin(node, doc),
                "roles": node.get("roles").cloned().unwrap_or_else(|| json!([])),
                "recommended_role": field(node, "recommended_role"),
                "rf_bands": node.get("rf_bands").cloned().unwrap_or_else(|| json!([])),
                "power_draw_w": profile_field(node, "estimated_draw_w"),
                "runtime_h": profile_field(node, "adjusted_runtime_h"),
            }
        }));
    }

    let links = doc
        .get("mesh_links")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    for link in links {
        let end = |key: &str| {
            link.get(key)
                .and_then(Value::as_str)
                .and_then(|id| located.get(id))
                .cloned()
        };
        let (Some(start), Some(stop)) = (end("from_node"), end("to_node")) else {
            continue;
        };
        features.push(json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [start, stop]},
            "properties": {
                "id": field(link, "id"),
                "origin_tool": origin(link, doc),
                "band": field(link, "band"),
                "estimated_range_km": field(link, "estimated_range_km"),
            }
        }));
    }

    json!({"type": "FeatureCollection", "features": features})
}

/// One CoT event per located node.
pub fn to_cot_events(doc: &Value) -> Vec<CotEvent> {
    nodes(doc)
        .iter()
        .filter_map(|node| {
            let pos = position(node)?;
            let text = |key: &str| node.get(key).and_then(Value::as_str).map(str::to_string);
            let bands: Vec<&str> = node
                .get("rf_bands")
                .and_then(Value::as_array)
                .map(|bands| bands.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            Some(CotEvent {
                uid: text("id").unwrap_or_default(),
                event_type: COT_TYPE.to_string(),
                how: COT_HOW.to_string(),
                lat: pos.lat,
                lon: pos.lon,
                hae: pos.elevation_m,
                name: text("name"),
                role: text("recommended_role"),
                remarks: format!("rf: {} | origin: {}", bands.join(","), origin(node, doc)),
            })
        })
        .collect()
}
