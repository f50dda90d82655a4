//! TOML-based tool configuration and preset definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::estimate::{AltitudeBand, Environment, EnvironmentProfile, FactorTables, TemperatureBand};
use crate::mission::Mission;

/// Top-level configuration parsed from TOML.
///
/// All tables have defaults matching the baseline preset. Load from TOML
/// with [`ArchitectConfig::from_toml_file`] or use
/// [`ArchitectConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchitectConfig {
    /// Component catalog location.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Mission descriptor written on exports.
    #[serde(default)]
    pub mission: MissionConfig,
    /// Environment defaults for new nodes and exports.
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Replaceable power, range and capacity lookup tables.
    #[serde(default)]
    pub factors: FactorTables,
    /// Log level and format for the binary.
    #[serde(default)]
    pub logging: LogConfig,
}

/// Component catalog location.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Path to the catalog JSON. Relative paths resolve against the
    /// working directory.
    pub path: Option<PathBuf>,
}

/// Mission descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionConfig {
    pub name: String,
    /// Area of operations.
    pub ao: Option<String>,
    pub objective: Option<String>,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            name: "Untitled mission".to_string(),
            ao: None,
            objective: None,
        }
    }
}

impl MissionConfig {
    pub fn to_mission(&self) -> Mission {
        Mission {
            name: self.name.clone(),
            ao: self.ao.clone(),
            objective: self.objective.clone(),
            ..Mission::default()
        }
    }
}

/// Environment defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// `lab`, `urban_indoor`, `urban_outdoor`, `rural_open` or `subterranean`.
    pub propagation: String,
    /// `sea_level`, `band_1000_2000`, `band_2000_3000` or `above_3000`.
    pub altitude_band: String,
    /// `hot`, `temperate`, `cold` or `very_cold`.
    pub temperature_band: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            propagation: "rural_open".to_string(),
            altitude_band: "sea_level".to_string(),
            temperature_band: "temperate".to_string(),
        }
    }
}

impl EnvironmentConfig {
    pub fn profile(&self) -> EnvironmentProfile {
        EnvironmentProfile::new(
            Environment::from(self.propagation.as_str()),
            AltitudeBand::from(self.altitude_band.as_str()),
            TemperatureBand::from(self.temperature_band.as_str()),
        )
    }
}

/// Logging parameters for the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`. `RUST_LOG` overrides it.
    pub level: String,
    /// `pretty`, `compact` or `json`.
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Known log levels.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
/// Known log formats.
pub const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"factors.range.lab"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl ArchitectConfig {
    /// Rural open ground at sea level, temperate.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// High-altitude winter deployment.
    pub fn whitefrost() -> Self {
        Self {
            mission: MissionConfig {
                name: "Project WHITEFROST Demo".to_string(),
                ao: Some("Alpine ridge line".to_string()),
                objective: Some("Cold-weather mesh and sensing".to_string()),
            },
            environment: EnvironmentConfig {
                altitude_band: "band_2000_3000".to_string(),
                temperature_band: "very_cold".to_string(),
                ..EnvironmentConfig::default()
            },
            ..Self::default()
        }
    }

    /// Dense urban street-level deployment.
    pub fn urban() -> Self {
        Self {
            mission: MissionConfig {
                name: "Urban canyon survey".to_string(),
                ..MissionConfig::default()
            },
            environment: EnvironmentConfig {
                propagation: "urban_outdoor".to_string(),
                ..EnvironmentConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "whitefrost", "urban"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "whitefrost" => Ok(Self::whitefrost()),
            "urban" => Ok(Self::urban()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Unknown
    /// environment labels are allowed; they read as factor 1.0.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.mission.name.trim().is_empty() {
            errors.push(ConfigError {
                field: "mission.name".into(),
                message: "must not be empty".into(),
            });
        }

        check_positive(&mut errors, "factors.power", &self.factors.power);
        check_positive(&mut errors, "factors.range", &self.factors.range);
        for (altitude, row) in &self.factors.capacity {
            for (temperature, value) in row {
                if !(value.is_finite() && *value > 0.0 && *value <= 1.0) {
                    errors.push(ConfigError {
                        field: format!("factors.capacity.{altitude}.{temperature}"),
                        message: format!("must be in (0.0, 1.0], got {value}"),
                    });
                }
            }
        }

        let log = &self.logging;
        if !LOG_LEVELS.contains(&log.level.as_str()) {
            errors.push(ConfigError {
                field: "logging.level".into(),
                message: format!("must be one of {}, got \"{}\"", LOG_LEVELS.join(", "), log.level),
            });
        }
        if !LOG_FORMATS.contains(&log.format.as_str()) {
            errors.push(ConfigError {
                field: "logging.format".into(),
                message: format!("must be one of {}, got \"{}\"", LOG_FORMATS.join(", "), log.format),
            });
        }

        errors
    }
}

fn check_positive(errors: &mut Vec<ConfigError>, table: &str, values: &BTreeMap<String, f64>) {
    for (key, value) in values {
        if !(value.is_finite() && *value > 0.0) {
            errors.push(ConfigError {
                field: format!("{table}.{key}"),
                message: format!("must be > 0, got {value}"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ArchitectConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ArchitectConfig::from_preset("nonexistent");
        assert!(err.as_ref().is_err_and(|e| e.message.contains("unknown preset")));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ArchitectConfig::PRESETS {
            let cfg = ArchitectConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn whitefrost_derates_capacity() {
        let cfg = ArchitectConfig::whitefrost();
        let env = cfg.environment.profile();
        assert_eq!(env.altitude_band, AltitudeBand::Band2000To3000);
        assert_eq!(
            cfg.factors.capacity_factor(&env.altitude_band, &env.temperature_band),
            0.76
        );
        assert_eq!(cfg.mission.name, "Project WHITEFROST Demo");
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[catalog]
path = "data/catalog.json"

[mission]
name = "Ridge"
ao = "Sector 4"

[environment]
propagation = "urban_outdoor"
temperature_band = "cold"

[factors.range]
urban_outdoor = 0.5

[logging]
level = "debug"
format = "json"
"#;
        let cfg = ArchitectConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref().and_then(|c| c.catalog.path.clone()),
            Some(PathBuf::from("data/catalog.json"))
        );
        assert_eq!(cfg.as_ref().map(|c| &*c.environment.altitude_band), Some("sea_level"));
        // a replaced table keeps only what the file lists
        assert_eq!(
            cfg.as_ref().map(|c| c.factors.range_factor(&Environment::UrbanOutdoor)),
            Some(0.5)
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.factors.range_factor(&Environment::Lab)),
            Some(1.0)
        );
        // untouched tables keep their defaults
        assert_eq!(
            cfg.as_ref().map(|c| c.factors.power_factor(&Environment::Lab)),
            Some(0.8)
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[mission]
name = "Ridge"
bogus_field = true
"#;
        assert!(ArchitectConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_factors() {
        let mut cfg = ArchitectConfig::baseline();
        cfg.factors.range.insert("lab".into(), 0.0);
        cfg.factors
            .capacity
            .entry("sea_level".into())
            .or_default()
            .insert("hot".into(), 1.2);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "factors.range.lab"));
        assert!(errors.iter().any(|e| e.field == "factors.capacity.sea_level.hot"));
    }

    #[test]
    fn validation_catches_bad_log_level() {
        let mut cfg = ArchitectConfig::baseline();
        cfg.logging.level = "loud".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "logging.level"));
    }
}
