//! JSON persistence for the design collection.
//!
//! Loading never fails: a missing or unreadable file yields an empty
//! collection plus a warning. Saving goes through a temporary file and a
//! rename, so an interrupted save leaves the previous file intact.

use std::fs;
use std::io::Write;
use std::path::Path;

use atomicwrites::{AtomicFile, OverwriteBehavior};

use crate::design::NodeDesign;
use crate::error::StoreError;

/// Designs read from disk, with the reason the file was ignored if it was.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub designs: Vec<NodeDesign>,
    pub warning: Option<String>,
}

/// Reads the design collection at `path`.
pub fn load_designs(path: &Path) -> Loaded {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => return empty(format!("cannot read designs \"{}\": {e}", path.display())),
    };
    match serde_json::from_str::<Vec<NodeDesign>>(&raw) {
        Ok(designs) => {
            tracing::debug!(path = %path.display(), designs = designs.len(), "designs loaded");
            Loaded {
                designs,
                warning: None,
            }
        }
        Err(e) => empty(format!("invalid designs file \"{}\": {e}", path.display())),
    }
}

fn empty(warning: String) -> Loaded {
    tracing::warn!("{warning}; starting with no designs");
    Loaded {
        designs: Vec::new(),
        warning: Some(warning),
    }
}

/// Writes the design collection to `path`, replacing any previous file.
///
/// # Errors
///
/// Returns a `StoreError` if serialization or the write fails; the file on
/// disk is unchanged in that case.
pub fn save_designs(path: &Path, designs: &[NodeDesign]) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(designs)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(path, e))?;
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(body.as_bytes())?;
            f.flush()
        })
        .map_err(|e| write_error(path, e))?;
    tracing::debug!(path = %path.display(), designs = designs.len(), "designs saved");
    Ok(())
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::Write {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::catalog::{Antenna, Battery, Compute, Radio};
    use crate::estimate::{EnvironmentProfile, FactorTables, NodeConfig, RfChain, evaluate};

    fn design() -> NodeDesign {
        let config = NodeConfig {
            compute: Compute {
                id: "pi5".into(),
                power_w_idle: Some(4.5),
                power_w_load: Some(11.0),
                ..Compute::default()
            },
            battery: Battery {
                id: "pack".into(),
                capacity_wh: Some(99.0),
                ..Battery::default()
            },
            chains: vec![RfChain {
                radio: Radio {
                    id: "lora".into(),
                    radio_type: "lora".into(),
                    ..Radio::default()
                },
                antenna: Antenna {
                    id: "whip".into(),
                    ..Antenna::default()
                },
            }],
            sensors: Vec::new(),
            environment: EnvironmentProfile::default(),
            location: None,
        };
        let result = evaluate(&config, &FactorTables::default()).expect("evaluates");
        NodeDesign::from_evaluation("node-a".into(), "A".into(), &config, &result, BTreeSet::new())
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("designs.json");
        save_designs(&path, &[design()]).expect("saves");

        let loaded = load_designs(&path);
        assert!(loaded.warning.is_none());
        assert_eq!(loaded.designs, vec![design()]);
    }

    #[test]
    fn missing_file_loads_empty_with_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load_designs(&dir.path().join("absent.json"));
        assert!(loaded.designs.is_empty());
        assert!(loaded.warning.is_some());
    }

    #[test]
    fn corrupt_file_loads_empty_with_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("designs.json");
        fs::write(&path, "[{\"id\": ").expect("write");
        let loaded = load_designs(&path);
        assert!(loaded.designs.is_empty());
        assert!(loaded.warning.is_some_and(|w| w.contains("invalid designs file")));
    }
}
