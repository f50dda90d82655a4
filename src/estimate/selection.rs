//! Id-level node descriptions and their resolution against the catalog.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::{
    AltitudeBand, Environment, EnvironmentProfile, Location, NodeConfig, RfChain, TemperatureBand,
};
use crate::catalog::Catalog;
use crate::error::EvaluationError;

/// One radio/antenna pairing by catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSelection {
    pub radio: String,
    pub antenna: String,
}

/// A node described by catalog ids, as gathered by a form or a build file.
///
/// Older build files name a single `radio` and `antenna`; those are treated as
/// the first chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSelection {
    /// Free-text description (build files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "compute")]
    pub host: Option<String>,
    pub battery: Option<String>,
    pub rf_chains: Vec<ChainSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antenna: Option<String>,
    pub sensors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_band: Option<AltitudeBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_band: Option<TemperatureBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl BuildSelection {
    /// Reads a build file.
    ///
    /// # Errors
    ///
    /// Returns a message naming the path when the file is unreadable or not
    /// a valid build description.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("cannot read build \"{}\": {e}", path.display()))?;
        serde_json::from_str(&raw).map_err(|e| format!("invalid build \"{}\": {e}", path.display()))
    }

    /// Explicit chains, or the legacy single radio/antenna pair.
    pub fn chains(&self) -> Vec<ChainSelection> {
        if !self.rf_chains.is_empty() {
            return self.rf_chains.clone();
        }
        match (&self.radio, &self.antenna) {
            (Some(radio), Some(antenna)) => vec![ChainSelection {
                radio: radio.clone(),
                antenna: antenna.clone(),
            }],
            _ => Vec::new(),
        }
    }
}

/// A resolved configuration plus the non-fatal gaps found while resolving it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: NodeConfig,
    pub warnings: Vec<String>,
}

impl NodeConfig {
    /// Resolves a selection against the catalog.
    ///
    /// Environment labels missing from the selection come from `defaults`.
    /// Chains naming an unknown radio or antenna are dropped with a warning,
    /// as are unknown sensors.
    ///
    /// # Errors
    ///
    /// Returns an `EvaluationError` when the host or battery is missing or
    /// unknown, or when no chain survives resolution.
    pub fn resolve(
        catalog: &Catalog,
        selection: &BuildSelection,
        defaults: &EnvironmentProfile,
    ) -> Result<Resolved, EvaluationError> {
        let compute = match &selection.host {
            None => return Err(EvaluationError::MissingCompute(None)),
            Some(id) => catalog
                .compute(id)
                .ok_or_else(|| EvaluationError::MissingCompute(Some(id.clone())))?,
        };
        let battery = match &selection.battery {
            None => return Err(EvaluationError::MissingBattery(None)),
            Some(id) => catalog
                .battery(id)
                .ok_or_else(|| EvaluationError::MissingBattery(Some(id.clone())))?,
        };

        let mut warnings = Vec::new();
        let mut chains = Vec::new();
        for (index, chain) in selection.chains().iter().enumerate() {
            match (catalog.radio(&chain.radio), catalog.antenna(&chain.antenna)) {
                (Some(radio), Some(antenna)) => chains.push(RfChain {
                    radio: radio.clone(),
                    antenna: antenna.clone(),
                }),
                _ => warnings.push(format!(
                    "RF chain {index} skipped: unknown radio \"{}\" or antenna \"{}\"",
                    chain.radio, chain.antenna
                )),
            }
        }
        if chains.is_empty() {
            return Err(EvaluationError::NoRfChain);
        }

        let mut sensors = Vec::new();
        for id in &selection.sensors {
            match catalog.sensor(id) {
                Some(sensor) => sensors.push(sensor.clone()),
                None => warnings.push(format!("unknown sensor \"{id}\" ignored")),
            }
        }

        let environment = EnvironmentProfile::new(
            selection
                .environment
                .clone()
                .unwrap_or_else(|| defaults.propagation.clone()),
            selection
                .altitude_band
                .clone()
                .unwrap_or_else(|| defaults.altitude_band.clone()),
            selection
                .temperature_band
                .clone()
                .unwrap_or_else(|| defaults.temperature_band.clone()),
        );

        Ok(Resolved {
            config: NodeConfig {
                compute: compute.clone(),
                battery: battery.clone(),
                chains,
                sensors,
                environment,
                location: selection.location,
            },
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Antenna, Battery, Compute, Radio};

    fn catalog() -> Catalog {
        Catalog {
            compute: vec![Compute {
                id: "pi5".into(),
                ..Compute::default()
            }],
            radios: vec![Radio {
                id: "lora".into(),
                radio_type: "lora".into(),
                ..Radio::default()
            }],
            antennas: vec![Antenna {
                id: "whip".into(),
                ..Antenna::default()
            }],
            batteries: vec![Battery {
                id: "pack".into(),
                capacity_wh: Some(50.0),
                ..Battery::default()
            }],
            sensors: Vec::new(),
        }
    }

    fn selection() -> BuildSelection {
        BuildSelection {
            host: Some("pi5".into()),
            battery: Some("pack".into()),
            radio: Some("lora".into()),
            antenna: Some("whip".into()),
            ..BuildSelection::default()
        }
    }

    #[test]
    fn legacy_single_radio_becomes_first_chain() {
        let resolved = NodeConfig::resolve(&catalog(), &selection(), &EnvironmentProfile::default())
            .expect("selection resolves");
        assert_eq!(resolved.config.chains.len(), 1);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn unknown_host_is_blocking() {
        let mut sel = selection();
        sel.host = Some("nope".into());
        let err = NodeConfig::resolve(&catalog(), &sel, &EnvironmentProfile::default())
            .expect_err("unknown host must fail");
        assert_eq!(err, EvaluationError::MissingCompute(Some("nope".into())));
    }

    #[test]
    fn no_usable_chain_is_blocking() {
        let mut sel = selection();
        sel.radio = Some("ghost".into());
        let err = NodeConfig::resolve(&catalog(), &sel, &EnvironmentProfile::default())
            .expect_err("no chain must fail");
        assert_eq!(err, EvaluationError::NoRfChain);
    }

    #[test]
    fn unknown_sensor_is_a_warning() {
        let mut sel = selection();
        sel.sensors = vec!["thermal".into()];
        sel.environment = Some(Environment::Lab);
        let resolved = NodeConfig::resolve(&catalog(), &sel, &EnvironmentProfile::default())
            .expect("selection resolves");
        assert_eq!(resolved.warnings.len(), 1);
        assert_eq!(resolved.config.environment.propagation, Environment::Lab);
    }
}
