//! Replaceable lookup tables for environment and battery derating.
//!
//! The tables are configuration data: `[factors]` in the TOML config replaces
//! any of them wholesale. Labels missing from a table read as 1.0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{AltitudeBand, Environment, TemperatureBand};

/// Environment power/range multipliers and the altitude × temperature
/// battery capacity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactorTables {
    /// Draw multiplier per propagation environment.
    pub power: BTreeMap<String, f64>,
    /// Link distance multiplier per propagation environment.
    pub range: BTreeMap<String, f64>,
    /// Usable-capacity multiplier, keyed by altitude band then temperature band.
    pub capacity: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for FactorTables {
    fn default() -> Self {
        let power = table(&[
            ("lab", 0.8),
            ("urban_indoor", 1.0),
            ("urban_outdoor", 1.1),
            ("rural_open", 1.0),
        ]);
        let range = table(&[
            ("lab", 0.7),
            ("urban_indoor", 0.3),
            ("urban_outdoor", 0.6),
            ("rural_open", 1.0),
            ("subterranean", 0.2),
        ]);
        let capacity = [
            ("sea_level", [1.0, 1.0, 0.95, 0.9]),
            ("band_1000_2000", [0.95, 0.93, 0.88, 0.82]),
            ("band_2000_3000", [0.9, 0.88, 0.82, 0.76]),
            ("above_3000", [0.85, 0.82, 0.75, 0.7]),
        ]
        .into_iter()
        .map(|(altitude, [hot, temperate, cold, very_cold])| {
            (
                altitude.to_string(),
                table(&[
                    ("hot", hot),
                    ("temperate", temperate),
                    ("cold", cold),
                    ("very_cold", very_cold),
                ]),
            )
        })
        .collect();

        Self {
            power,
            range,
            capacity,
        }
    }
}

fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl FactorTables {
    pub fn power_factor(&self, environment: &Environment) -> f64 {
        self.power.get(environment.as_str()).copied().unwrap_or(1.0)
    }

    pub fn range_factor(&self, environment: &Environment) -> f64 {
        self.range.get(environment.as_str()).copied().unwrap_or(1.0)
    }

    pub fn capacity_factor(&self, altitude: &AltitudeBand, temperature: &TemperatureBand) -> f64 {
        self.capacity
            .get(altitude.as_str())
            .and_then(|row| row.get(temperature.as_str()))
            .copied()
            .unwrap_or(1.0)
    }
}
