//! API request and response types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::estimate::{Constraints, Role};
use crate::workspace::DesignStatus;

/// Body of `POST /designs`: saves the last evaluation.
#[derive(Debug, Deserialize)]
pub struct SaveDesignRequest {
    pub name: String,
    #[serde(default)]
    pub notes: String,
    /// Empty means "use the suggested roles".
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

/// One row of `GET /designs`.
#[derive(Debug, Serialize)]
pub struct DesignSummary {
    pub id: String,
    pub name: String,
    pub mission: String,
    pub roles: Vec<String>,
    pub recommended_role: String,
    pub weight_kg: f64,
    pub draw_w: f64,
    pub adjusted_runtime_h: f64,
    pub capabilities: Vec<String>,
    pub rf_bands: Vec<String>,
    /// Whether the design meets the active constraints.
    pub passes: bool,
    pub warnings: Vec<String>,
}

impl From<DesignStatus<'_>> for DesignSummary {
    fn from(status: DesignStatus<'_>) -> Self {
        let d = status.design;
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            mission: d.mission.clone(),
            roles: d.roles.iter().map(|r| r.as_str().to_string()).collect(),
            recommended_role: d.recommended_role.clone(),
            weight_kg: d.weight_kg,
            draw_w: d.runtime.total_power_w,
            adjusted_runtime_h: d.runtime.adjusted_runtime_hours,
            capabilities: d.capabilities.iter().cloned().collect(),
            rf_bands: d.rf_bands.clone(),
            passes: status.passes,
            warnings: status.warnings,
        }
    }
}

/// `GET /designs` response.
#[derive(Debug, Serialize)]
pub struct DesignsResponse {
    pub mission: String,
    pub constraints: Constraints,
    pub designs: Vec<DesignSummary>,
}

/// Optional query for `GET /project`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    /// Emit the deprecated v1 layout.
    #[serde(default)]
    pub legacy: bool,
}

/// `POST /project` response.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub warnings: Vec<String>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Per-node reasons, when an import was rejected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
