//! Typed, read-only access to the component catalog.
//!
//! The catalog is an external JSON document with one array per component
//! kind. Every entry needs an `id`; every numeric attribute is optional and
//! reads as zero when absent.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A compute host (single-board computer, mini PC, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Compute {
    /// Stable catalog id.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Relative compute capability, roughly 1 (MCU) to 10 (GPU module).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Idle draw (W).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_w_idle: Option<f64>,
    /// Loaded draw (W).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_w_load: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    /// Maximum number of RF chains the host can drive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rf_chains: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Compute {
    /// Mean of idle and loaded draw, or 0 when either figure is missing.
    pub fn average_power_w(&self) -> f64 {
        match (self.power_w_idle, self.power_w_load) {
            (Some(idle), Some(load)) => (idle + load) / 2.0,
            _ => 0.0,
        }
    }

    pub fn cpu_score(&self) -> f64 {
        self.cpu_score.unwrap_or(0.0)
    }
}

/// A radio module. `radio_type` drives range, capability and role rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Radio {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `wifi`, `lora`, `analog_fpv`, `sdr`, `cellular`, or anything else.
    #[serde(default)]
    pub radio_type: String,
    /// Single band label (older catalogs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    /// Band labels, e.g. `["2.4GHz", "5GHz"]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<String>,
    /// Transmit draw (W).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_w_tx: Option<f64>,
    /// Receive draw (W).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_w_rx: Option<f64>,
    /// Gain of the radio's own antenna (dBi), used when the chain antenna has none.
    #[serde(
        default,
        alias = "antenna_gain",
        alias = "antenna_gain_db",
        skip_serializing_if = "Option::is_none"
    )]
    pub antenna_gain_dbi: Option<f64>,
    #[serde(default)]
    pub supports_monitor: bool,
    #[serde(default)]
    pub supports_csi: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

impl Radio {
    /// Mean of transmit and receive draw; a missing figure counts as 0.
    pub fn average_power_w(&self) -> f64 {
        (self.power_w_tx.unwrap_or(0.0) + self.power_w_rx.unwrap_or(0.0)) / 2.0
    }

    /// Lowercased radio type.
    pub fn kind(&self) -> String {
        self.radio_type.to_lowercase()
    }

    pub fn is_type(&self, radio_type: &str) -> bool {
        self.radio_type.eq_ignore_ascii_case(radio_type)
    }

    /// All band labels joined into one lowercase string for substring matching.
    pub fn band_text(&self) -> String {
        let mut text = self.bands.join(" ");
        if let Some(band) = &self.band {
            text.push(' ');
            text.push_str(band);
        }
        text.to_lowercase()
    }

    /// Normalized band identifiers (`bands` first, falling back to `band`).
    pub fn rf_bands(&self) -> Vec<String> {
        let labels: Vec<&String> = if self.bands.is_empty() {
            self.band.iter().collect()
        } else {
            self.bands.iter().collect()
        };
        labels
            .into_iter()
            .map(|b| b.to_lowercase().replace('/', "_"))
            .filter(|b| !b.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Antenna {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "gain_db", skip_serializing_if = "Option::is_none")]
    pub gain_dbi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Battery {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Nominal energy (Wh).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_wh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemistry: Option<String>,
    #[serde(default, alias = "mass_kg", skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Battery {
    pub fn capacity_wh(&self) -> f64 {
        self.capacity_wh.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `camera`, `gps`, `imu`, `environmental`, ...
    #[serde(default, alias = "type")]
    pub sensor_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Sensor {
    pub fn is_type(&self, sensor_type: &str) -> bool {
        self.sensor_type.eq_ignore_ascii_case(sensor_type)
    }
}

/// The full component catalog. Entries are never mutated after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, alias = "hosts")]
    pub compute: Vec<Compute>,
    #[serde(default)]
    pub radios: Vec<Radio>,
    #[serde(default)]
    pub antennas: Vec<Antenna>,
    #[serde(default)]
    pub batteries: Vec<Battery>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl Catalog {
    /// Reads and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the file is unreadable, malformed, or
    /// repeats an id within one component kind.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            compute = catalog.compute.len(),
            radios = catalog.radios.len(),
            antennas = catalog.antennas.len(),
            batteries = catalog.batteries.len(),
            sensors = catalog.sensors.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parses and validates a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` on malformed JSON or duplicate ids.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    fn check_unique_ids(&self) -> Result<(), CatalogError> {
        unique(self.compute.iter().map(|c| c.id.as_str()), "compute")?;
        unique(self.radios.iter().map(|r| r.id.as_str()), "radio")?;
        unique(self.antennas.iter().map(|a| a.id.as_str()), "antenna")?;
        unique(self.batteries.iter().map(|b| b.id.as_str()), "battery")?;
        unique(self.sensors.iter().map(|s| s.id.as_str()), "sensor")
    }

    pub fn compute(&self, id: &str) -> Option<&Compute> {
        self.compute.iter().find(|c| c.id == id)
    }

    pub fn radio(&self, id: &str) -> Option<&Radio> {
        self.radios.iter().find(|r| r.id == id)
    }

    pub fn antenna(&self, id: &str) -> Option<&Antenna> {
        self.antennas.iter().find(|a| a.id == id)
    }

    pub fn battery(&self, id: &str) -> Option<&Battery> {
        self.batteries.iter().find(|b| b.id == id)
    }

    pub fn sensor(&self, id: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.id == id)
    }
}

fn unique<'a>(ids: impl Iterator<Item = &'a str>, kind: &'static str) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
