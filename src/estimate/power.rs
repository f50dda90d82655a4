//! Power draw and battery runtime estimation.

use serde::{Deserialize, Serialize};

use super::factors::FactorTables;
use super::types::{NodeConfig, RfChain};
use crate::catalog::{Compute, Sensor};

/// Power and runtime figures for one node.
///
/// `environment_runtime_hours = capacity / (base_power_w * environment_power_factor)`
/// and `adjusted_runtime_hours = environment_runtime_hours * capacity_factor`.
/// Every field is finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RuntimeBreakdown {
    /// Host + radios + sensors before environment scaling (W).
    pub base_power_w: f64,
    /// Draw multiplier for the propagation environment.
    pub environment_power_factor: f64,
    /// `base_power_w * environment_power_factor` (W).
    pub total_power_w: f64,
    /// Usable-capacity multiplier for altitude and temperature.
    pub capacity_factor: f64,
    /// Capacity over base draw (h).
    pub base_runtime_hours: f64,
    /// Capacity over environment-scaled draw (h).
    pub environment_runtime_hours: f64,
    /// Environment runtime derated by the capacity factor (h).
    pub adjusted_runtime_hours: f64,
}

/// Combined average draw of host, radios and sensors (W).
///
/// Missing figures contribute nothing.
pub fn base_power_w(compute: &Compute, chains: &[RfChain], sensors: &[Sensor]) -> f64 {
    let host = compute.average_power_w();
    let radios: f64 = chains.iter().map(|c| c.radio.average_power_w()).sum();
    let sensors: f64 = sensors.iter().filter_map(|s| s.power_w).sum();
    non_negative(host + radios + sensors)
}

/// Estimates draw and runtime for a node configuration.
///
/// Never fails: absent draw or capacity figures yield zero runtimes rather
/// than NaN or infinity.
pub fn estimate_runtime(config: &NodeConfig, tables: &FactorTables) -> RuntimeBreakdown {
    let env = &config.environment;
    let base_power_w = base_power_w(&config.compute, &config.chains, &config.sensors);
    let environment_power_factor = tables.power_factor(&env.propagation);
    let total_power_w = non_negative(base_power_w * environment_power_factor);
    let capacity_factor = tables.capacity_factor(&env.altitude_band, &env.temperature_band);

    let capacity_wh = config.battery.capacity_wh();
    let base_runtime_hours = runtime_hours(capacity_wh, base_power_w);
    let environment_runtime_hours = runtime_hours(capacity_wh, total_power_w);
    let adjusted_runtime_hours = non_negative(environment_runtime_hours * capacity_factor);

    RuntimeBreakdown {
        base_power_w,
        environment_power_factor,
        total_power_w,
        capacity_factor,
        base_runtime_hours,
        environment_runtime_hours,
        adjusted_runtime_hours,
    }
}

fn runtime_hours(capacity_wh: f64, power_w: f64) -> f64 {
    if power_w <= 0.0 || capacity_wh <= 0.0 {
        return 0.0;
    }
    non_negative(capacity_wh / power_w)
}

/// Collapses negative and non-finite values to 0.
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
