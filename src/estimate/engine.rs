//! Full node evaluation: power, range, capabilities, role.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::capability::{advisory_notes, derive_capabilities, suggest_roles};
use super::factors::FactorTables;
use super::power::{RuntimeBreakdown, estimate_runtime};
use super::range::{ChainRange, estimate_ranges};
use super::role::{RoleInputs, recommend_role};
use super::types::{NodeConfig, Role};
use crate::error::EvaluationError;

/// Everything the estimator derives for one node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub runtime: RuntimeBreakdown,
    /// One entry per RF chain, in chain order.
    pub ranges: Vec<ChainRange>,
    pub capabilities: BTreeSet<String>,
    pub recommended_role: String,
    /// Roles the node is naturally suited to.
    pub suggested_roles: BTreeSet<Role>,
    pub rf_bands: Vec<String>,
    pub weight_kg: f64,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

/// Evaluates a node configuration.
///
/// Pure: identical inputs always produce identical results.
///
/// # Errors
///
/// Returns `EvaluationError::NoRfChain` when the configuration has no chains.
pub fn evaluate(config: &NodeConfig, tables: &FactorTables) -> Result<EvaluationResult, EvaluationError> {
    if config.chains.is_empty() {
        return Err(EvaluationError::NoRfChain);
    }

    let runtime = estimate_runtime(config, tables);
    let ranges = estimate_ranges(&config.chains, &config.environment.propagation, tables);
    let capabilities = derive_capabilities(&config.chains, &config.sensors);
    let inputs = RoleInputs::new(
        &config.compute,
        &config.chains,
        &config.sensors,
        runtime.adjusted_runtime_hours,
    );

    let mut warnings = Vec::new();
    if let Some(max) = config.compute.max_rf_chains
        && config.chains.len() > max as usize
    {
        warnings.push(format!(
            "{} RF chains exceed host \"{}\" maximum of {max}",
            config.chains.len(),
            config.compute.id
        ));
    }
    if config.battery.capacity_wh() <= 0.0 {
        warnings.push(format!("battery \"{}\" has no capacity figure", config.battery.id));
    }
    if runtime.base_power_w <= 0.0 {
        warnings.push("no power draw figures; runtime reported as 0".to_string());
    }

    Ok(EvaluationResult {
        runtime,
        ranges,
        capabilities,
        recommended_role: recommend_role(&inputs),
        suggested_roles: suggest_roles(&config.chains, &config.sensors),
        rf_bands: config.rf_bands(),
        weight_kg: config.total_weight_kg(),
        notes: advisory_notes(&config.compute, &config.chains),
        warnings,
    })
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.runtime;
        writeln!(f, "--- Node Estimate ---")?;
        writeln!(f, "Base draw: {:.2} W", r.base_power_w)?;
        writeln!(
            f,
            "Environment draw: {:.2} W (x{:.2})",
            r.total_power_w, r.environment_power_factor
        )?;
        writeln!(f, "Ideal runtime: {:.2} h", r.base_runtime_hours)?;
        writeln!(f, "Environment runtime: {:.2} h", r.environment_runtime_hours)?;
        writeln!(
            f,
            "Adjusted runtime: {:.2} h (capacity x{:.2})",
            r.adjusted_runtime_hours, r.capacity_factor
        )?;
        writeln!(f, "Weight: {:.2} kg", self.weight_kg)?;
        for chain in &self.ranges {
            match chain.estimate.range_m {
                Some(m) => writeln!(
                    f,
                    "Range [{} + {}]: {m} m ({})",
                    chain.radio_id, chain.antenna_id, chain.estimate.description
                )?,
                None => writeln!(
                    f,
                    "Range [{} + {}]: {}",
                    chain.radio_id, chain.antenna_id, chain.estimate.description
                )?,
            }
        }
        for cap in &self.capabilities {
            writeln!(f, "Capability: {cap}")?;
        }
        write!(f, "Recommended role: {}", self.recommended_role)?;
        for note in &self.notes {
            write!(f, "\nNote: {note}")?;
        }
        for warning in &self.warnings {
            write!(f, "\nWarning: {warning}")?;
        }
        Ok(())
    }
}
