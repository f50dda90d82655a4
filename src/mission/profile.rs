//! Canonical power profile for MissionProject nodes.
//!
//! Producers have named these figures differently over time. Each canonical
//! field has an ordered synonym list; the first key present with a numeric
//! value wins. Resolution happens once here, at the import boundary.

use serde_json::{Map, Value, json};

use crate::estimate::RuntimeBreakdown;

const DRAW_W: &[&str] = &["estimated_draw_w", "draw_w", "total_power_w", "power_w"];
const BASE_DRAW_W: &[&str] = &["base_draw_w", "base_power_w"];
const ENV_POWER_FACTOR: &[&str] = &["environment_power_factor", "env_power_factor"];
const IDEAL_RUNTIME_H: &[&str] = &["ideal_runtime_h", "base_runtime_h", "runtime_hours"];
const ENV_RUNTIME_H: &[&str] = &["environment_runtime_h", "env_runtime_h"];
const ADJUSTED_RUNTIME_H: &[&str] = &["adjusted_runtime_h", "runtime_h"];
const CAPACITY_FACTOR: &[&str] = &["capacity_factor", "battery_capacity_factor"];

/// Power figures read from a document, each possibly absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerProfile {
    pub draw_w: Option<f64>,
    pub base_draw_w: Option<f64>,
    pub environment_power_factor: Option<f64>,
    pub ideal_runtime_h: Option<f64>,
    pub environment_runtime_h: Option<f64>,
    pub adjusted_runtime_h: Option<f64>,
    pub capacity_factor: Option<f64>,
}

impl PowerProfile {
    /// Reads a node's `power_profile` object.
    ///
    /// `estimated_runtime_min` is the node-level minutes figure older
    /// documents carry instead of an adjusted runtime.
    pub fn resolve(raw: Option<&Map<String, Value>>, estimated_runtime_min: Option<f64>) -> Self {
        let pick = |keys: &[&str]| raw.and_then(|map| first_number(map, keys));
        Self {
            draw_w: pick(DRAW_W),
            base_draw_w: pick(BASE_DRAW_W),
            environment_power_factor: pick(ENV_POWER_FACTOR),
            ideal_runtime_h: pick(IDEAL_RUNTIME_H),
            environment_runtime_h: pick(ENV_RUNTIME_H),
            adjusted_runtime_h: pick(ADJUSTED_RUNTIME_H)
                .or_else(|| estimated_runtime_min.filter(|m| m.is_finite()).map(|m| m / 60.0)),
            capacity_factor: pick(CAPACITY_FACTOR),
        }
    }

    /// Merges document figures over a freshly computed breakdown.
    ///
    /// Document values win; computed values fill whatever the document
    /// left out. Negative or non-finite document values are ignored.
    pub fn backfill(&self, computed: &RuntimeBreakdown) -> RuntimeBreakdown {
        let or = |doc: Option<f64>, fallback: f64| doc.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(fallback);
        RuntimeBreakdown {
            base_power_w: or(self.base_draw_w, computed.base_power_w),
            environment_power_factor: or(self.environment_power_factor, computed.environment_power_factor),
            total_power_w: or(self.draw_w, computed.total_power_w),
            capacity_factor: or(self.capacity_factor, computed.capacity_factor),
            base_runtime_hours: or(self.ideal_runtime_h, computed.base_runtime_hours),
            environment_runtime_hours: or(self.environment_runtime_h, computed.environment_runtime_hours),
            adjusted_runtime_hours: or(self.adjusted_runtime_h, computed.adjusted_runtime_hours),
        }
    }
}

/// The exported `power_profile` object, figures rounded to two decimals.
pub fn profile_object(runtime: &RuntimeBreakdown) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("estimated_draw_w".into(), json!(round2(runtime.total_power_w)));
    map.insert("base_draw_w".into(), json!(round2(runtime.base_power_w)));
    map.insert(
        "environment_power_factor".into(),
        json!(round2(runtime.environment_power_factor)),
    );
    map.insert("ideal_runtime_h".into(), json!(round2(runtime.base_runtime_hours)));
    map.insert(
        "environment_runtime_h".into(),
        json!(round2(runtime.environment_runtime_hours)),
    );
    map.insert("adjusted_runtime_h".into(), json!(round2(runtime.adjusted_runtime_hours)));
    map.insert("capacity_factor".into(), json!(round2(runtime.capacity_factor)));
    map
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn first_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| map.get(*key).and_then(number))
}

/// Numbers, and numeric strings written by looser producers.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
