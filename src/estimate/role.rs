//! Heuristic operational-role recommendation.
//!
//! Rules are evaluated top to bottom and the first match wins, most specific
//! capability first: CSI, monitor-mode recon, LoRa endurance, FPV, SDR.
//! A cellular chain appends a backhaul suffix to whichever role was chosen.

use super::types::RfChain;
use crate::catalog::{Compute, Sensor};

pub const DEFAULT_ROLE: &str = "General-purpose RF node";
pub const BACKHAUL_SUFFIX: &str = " with LTE/5G backhaul";

/// Facts about a node that the role rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoleInputs {
    pub has_wifi_csi: bool,
    pub has_wifi_monitor: bool,
    pub has_lora: bool,
    pub has_analog_fpv: bool,
    pub has_sdr: bool,
    pub has_camera: bool,
    pub has_cellular: bool,
    pub cpu_score: f64,
    /// Adjusted runtime (h).
    pub runtime_hours: f64,
}

impl RoleInputs {
    pub fn new(compute: &Compute, chains: &[RfChain], sensors: &[Sensor], runtime_hours: f64) -> Self {
        let wifi = || chains.iter().filter(|c| c.radio.is_type("wifi"));
        let any_type = |t: &str| chains.iter().any(|c| c.radio.is_type(t));
        Self {
            has_wifi_csi: wifi().any(|c| c.radio.supports_csi),
            has_wifi_monitor: wifi().any(|c| c.radio.supports_monitor),
            has_lora: any_type("lora"),
            has_analog_fpv: any_type("analog_fpv"),
            has_sdr: any_type("sdr"),
            has_camera: sensors.iter().any(|s| s.is_type("camera")),
            has_cellular: any_type("cellular"),
            cpu_score: compute.cpu_score(),
            runtime_hours,
        }
    }
}

struct RoleRule {
    label: &'static str,
    applies: fn(&RoleInputs) -> bool,
}

const RULES: &[RoleRule] = &[
    RoleRule {
        label: "Experimental WiFi CSI / through-wall sensing node",
        applies: |i| i.has_wifi_csi && i.cpu_score >= 7.0 && i.runtime_hours >= 2.0,
    },
    RoleRule {
        label: "Recon / RF mapping node",
        applies: |i| i.has_wifi_monitor && i.cpu_score >= 5.0 && i.runtime_hours >= 2.0,
    },
    RoleRule {
        label: "Low-power perimeter/telemetry node",
        applies: |i| i.has_lora && i.runtime_hours >= 12.0,
    },
    RoleRule {
        label: "FPV video relay / payload node",
        applies: |i| i.has_analog_fpv && i.has_camera,
    },
    RoleRule {
        label: "RF capture / lab or field survey node",
        applies: |i| i.has_sdr && i.cpu_score >= 6.0,
    },
];

/// Picks one human-readable role label.
pub fn recommend_role(inputs: &RoleInputs) -> String {
    let base = RULES
        .iter()
        .find(|rule| (rule.applies)(inputs))
        .map_or(DEFAULT_ROLE, |rule| rule.label);
    if inputs.has_cellular {
        format!("{base}{BACKHAUL_SUFFIX}")
    } else {
        base.to_string()
    }
}
