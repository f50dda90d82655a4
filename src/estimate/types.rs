//! Core estimation types: environment labels, RF chains, and node configuration.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{Antenna, Battery, Compute, Radio, Sensor};

/// Declares a string-backed label enum whose unknown values survive verbatim
/// in an `Other` variant, so documents carrying labels from newer tools
/// round-trip unchanged.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A label outside the built-in set, kept verbatim.
            Other(String),
        }

        impl $name {
            /// Every built-in label, in declaration order.
            pub const KNOWN: &'static [&'static str] = &[$($key),+];

            /// The wire label.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $key,)+
                    Self::Other(label) => label.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(label: String) -> Self {
                match label.trim().to_ascii_lowercase().as_str() {
                    $($key => Self::$variant,)+
                    _ => Self::Other(label),
                }
            }
        }

        impl From<&str> for $name {
            fn from(label: &str) -> Self {
                Self::from(label.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(label) => label,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum! {
    /// Propagation setting the node is deployed in.
    Environment {
        Lab => "lab",
        UrbanIndoor => "urban_indoor",
        UrbanOutdoor => "urban_outdoor",
        RuralOpen => "rural_open",
        Subterranean => "subterranean",
    }
}

label_enum! {
    /// Deployment altitude band.
    AltitudeBand {
        SeaLevel => "sea_level",
        Band1000To2000 => "band_1000_2000",
        Band2000To3000 => "band_2000_3000",
        Above3000 => "above_3000",
    }
}

label_enum! {
    /// Ambient temperature band.
    TemperatureBand {
        Hot => "hot",
        Temperate => "temperate",
        Cold => "cold",
        VeryCold => "very_cold",
    }
}

label_enum! {
    /// Operational role a node is assigned in a mission.
    Role {
        Recon => "recon",
        Relay => "relay",
        Sensor => "sensor",
        Telemetry => "telemetry",
        Video => "video",
        Capture => "capture",
        Backhaul => "backhaul",
        Compute => "compute",
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::RuralOpen
    }
}

impl Default for AltitudeBand {
    fn default() -> Self {
        Self::SeaLevel
    }
}

impl Default for TemperatureBand {
    fn default() -> Self {
        Self::Temperate
    }
}

/// Reads an explicit `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The environment trio every evaluation runs under.
///
/// Keys written by other tools (terrain, canopy, ...) ride along in `extra`
/// and are emitted again on export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub propagation: Environment,
    #[serde(deserialize_with = "null_as_default")]
    pub altitude_band: AltitudeBand,
    #[serde(deserialize_with = "null_as_default")]
    pub temperature_band: TemperatureBand,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvironmentProfile {
    pub fn new(propagation: Environment, altitude_band: AltitudeBand, temperature_band: TemperatureBand) -> Self {
        Self {
            propagation,
            altitude_band,
            temperature_band,
            extra: Map::new(),
        }
    }

    /// Reads a partial environment object on top of `self`.
    ///
    /// Keys absent from `overlay` (or set to `null`) keep the value from
    /// `self`; unknown keys are added to `extra`.
    ///
    /// # Errors
    ///
    /// Returns the serde error when `overlay` is not an object or a label is
    /// not a string.
    pub fn overlaid_with(&self, overlay: &Value) -> Result<Self, serde_json::Error> {
        let Value::Object(fields) = overlay else {
            return serde_json::from_value(overlay.clone());
        };
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in fields {
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(Value::Object(merged))
    }
}

/// Optional geographic placement of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
}

/// One radio paired with one antenna.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfChain {
    pub radio: Radio,
    pub antenna: Antenna,
}

/// Everything the estimator needs for one node, built fresh per evaluation.
///
/// Chain order carries no meaning for the outputs but is preserved for
/// reporting and export.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub compute: Compute,
    pub battery: Battery,
    pub chains: Vec<RfChain>,
    pub sensors: Vec<Sensor>,
    pub environment: EnvironmentProfile,
    pub location: Option<Location>,
}

impl NodeConfig {
    /// Sum of every component weight; missing weights count as 0.
    pub fn total_weight_kg(&self) -> f64 {
        let chains: f64 = self
            .chains
            .iter()
            .map(|c| c.radio.weight_kg.unwrap_or(0.0) + c.antenna.weight_kg.unwrap_or(0.0))
            .sum();
        let sensors: f64 = self.sensors.iter().filter_map(|s| s.weight_kg).sum();
        self.compute.weight_kg.unwrap_or(0.0) + self.battery.weight_kg.unwrap_or(0.0) + chains + sensors
    }

    /// Band identifiers across all chains, deduplicated in first-seen order.
    pub fn rf_bands(&self) -> Vec<String> {
        let mut bands: Vec<String> = Vec::new();
        for band in self.chains.iter().flat_map(|c| c.radio.rf_bands()) {
            if !bands.contains(&band) {
                bands.push(band);
            }
        }
        bands
    }

    pub fn has_radio_type(&self, radio_type: &str) -> bool {
        self.chains.iter().any(|c| c.radio.is_type(radio_type))
    }
}
