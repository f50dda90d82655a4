//! Capability tags derived from radios and sensors.

use std::collections::BTreeSet;

use super::types::{RfChain, Role};
use crate::catalog::{Compute, Sensor};

pub const WIFI_MONITOR: &str = "WiFi recon / monitor mode scanning";
pub const WIFI_CSI: &str = "WiFi CSI / channel analysis (driver support required)";
pub const LORA_TELEMETRY: &str = "LoRa telemetry / low-rate sensor network";
pub const FPV_VIDEO: &str = "Analog FPV video link";
pub const SDR_CAPTURE: &str = "SDR-based RF capture / analysis";
pub const CELLULAR_BACKHAUL: &str = "Cellular backhaul for remote deployment";
pub const VIDEO_CAPTURE: &str = "Video capture";
pub const GPS_REFERENCE: &str = "GPS time/position reference";
pub const IMU_MOTION: &str = "IMU / motion sensing";
pub const ENVIRONMENTAL_SENSING: &str = "Environmental sensing (temp/humidity)";

/// Derives the capability set for a node.
///
/// Each rule is independent; duplicates collapse, and the result does not
/// depend on chain or sensor order.
pub fn derive_capabilities(chains: &[RfChain], sensors: &[Sensor]) -> BTreeSet<String> {
    let mut caps = BTreeSet::new();

    for chain in chains {
        let radio = &chain.radio;
        match radio.kind().as_str() {
            "wifi" => {
                if radio.supports_monitor {
                    caps.insert(WIFI_MONITOR);
                }
                if radio.supports_csi {
                    caps.insert(WIFI_CSI);
                }
            }
            "lora" => {
                caps.insert(LORA_TELEMETRY);
            }
            "analog_fpv" => {
                caps.insert(FPV_VIDEO);
            }
            "sdr" => {
                caps.insert(SDR_CAPTURE);
            }
            "cellular" => {
                caps.insert(CELLULAR_BACKHAUL);
            }
            _ => {}
        }
    }

    for sensor in sensors {
        match sensor.sensor_type.to_lowercase().as_str() {
            "camera" => {
                caps.insert(VIDEO_CAPTURE);
            }
            "gps" => {
                caps.insert(GPS_REFERENCE);
            }
            "imu" => {
                caps.insert(IMU_MOTION);
            }
            "environment" | "environmental" => {
                caps.insert(ENVIRONMENTAL_SENSING);
            }
            _ => {}
        }
    }

    caps.into_iter().map(str::to_string).collect()
}

/// Mission roles a node is naturally suited to, used when a design is saved
/// without explicit roles.
pub fn suggest_roles(chains: &[RfChain], sensors: &[Sensor]) -> BTreeSet<Role> {
    let mut roles = BTreeSet::new();
    for chain in chains {
        let radio = &chain.radio;
        match radio.kind().as_str() {
            "wifi" if radio.supports_monitor || radio.supports_csi => {
                roles.insert(Role::Recon);
            }
            "wifi" => {
                roles.insert(Role::Relay);
            }
            "lora" => {
                roles.insert(Role::Telemetry);
            }
            "analog_fpv" => {
                roles.insert(Role::Video);
            }
            "sdr" => {
                roles.insert(Role::Capture);
            }
            "cellular" => {
                roles.insert(Role::Backhaul);
            }
            _ => {}
        }
    }
    if !sensors.is_empty() {
        roles.insert(Role::Sensor);
    }
    roles
}

/// Advisory notes that do not affect any estimate.
pub fn advisory_notes(compute: &Compute, chains: &[RfChain]) -> Vec<String> {
    let mut notes = Vec::new();
    if chains.iter().any(|c| c.radio.supports_csi) {
        if compute.cpu_score() >= 8.0 {
            notes.push("Host strong enough for CSI pose models".to_string());
        } else {
            notes.push("CSI available; keep models lightweight".to_string());
        }
    }
    if chains.iter().any(|c| c.radio.is_type("cellular")) {
        notes.push("Assumes LTE/5G coverage for backhaul".to_string());
    }
    notes
}
