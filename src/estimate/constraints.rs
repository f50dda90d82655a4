//! Mission constraint checks over evaluated nodes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::types::Role;

/// Active mission filters. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub max_weight_kg: Option<f64>,
    pub min_runtime_hours: Option<f64>,
    pub required_roles: BTreeSet<Role>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.max_weight_kg.is_none() && self.min_runtime_hours.is_none() && self.required_roles.is_empty()
    }
}

/// The figures a constraint check looks at.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintSubject<'a> {
    pub weight_kg: f64,
    /// Adjusted runtime (h).
    pub runtime_hours: f64,
    pub roles: &'a BTreeSet<Role>,
}

/// Outcome of a constraint check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstraintReport {
    pub passes: bool,
    /// Populated only when warnings were requested.
    pub warnings: Vec<String>,
}

/// Checks a node against the active constraints.
///
/// The three checks are independent; any single failure fails the node.
pub fn evaluate_constraints(
    subject: &ConstraintSubject<'_>,
    constraints: &Constraints,
    with_warnings: bool,
) -> ConstraintReport {
    let mut passes = true;
    let mut warnings = Vec::new();

    if let Some(max) = constraints.max_weight_kg
        && subject.weight_kg > max
    {
        passes = false;
        if with_warnings {
            warnings.push(format!(
                "weight {:.2} kg exceeds max {:.2} kg",
                subject.weight_kg, max
            ));
        }
    }

    if let Some(min) = constraints.min_runtime_hours
        && subject.runtime_hours < min
    {
        passes = false;
        if with_warnings {
            warnings.push(format!(
                "runtime {:.2} h below min {:.2} h",
                subject.runtime_hours, min
            ));
        }
    }

    let missing: Vec<&str> = constraints
        .required_roles
        .iter()
        .filter(|role| !subject.roles.contains(role))
        .map(Role::as_str)
        .collect();
    if !missing.is_empty() {
        passes = false;
        if with_warnings {
            warnings.push(format!("missing required roles: {}", missing.join(", ")));
        }
    }

    ConstraintReport { passes, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(roles: &BTreeSet<Role>) -> ConstraintSubject<'_> {
        ConstraintSubject {
            weight_kg: 1.5,
            runtime_hours: 8.0,
            roles,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let roles = BTreeSet::new();
        let constraints = Constraints {
            max_weight_kg: Some(1.5),
            min_runtime_hours: Some(8.0),
            ..Constraints::default()
        };
        let report = evaluate_constraints(&subject(&roles), &constraints, true);
        assert!(report.passes);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn one_unit_over_fails() {
        let roles = BTreeSet::new();
        let constraints = Constraints {
            max_weight_kg: Some(0.5),
            min_runtime_hours: Some(9.0),
            ..Constraints::default()
        };
        let report = evaluate_constraints(&subject(&roles), &constraints, true);
        assert!(!report.passes);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("1.50"));
        assert!(report.warnings[0].contains("0.50"));
    }

    #[test]
    fn missing_roles_are_listed() {
        let roles: BTreeSet<Role> = [Role::Relay].into_iter().collect();
        let constraints = Constraints {
            required_roles: [Role::Relay, Role::Recon, Role::Sensor].into_iter().collect(),
            ..Constraints::default()
        };
        let report = evaluate_constraints(&subject(&roles), &constraints, true);
        assert!(!report.passes);
        assert_eq!(report.warnings, vec!["missing required roles: recon, sensor".to_string()]);
    }

    #[test]
    fn warnings_only_on_request() {
        let roles = BTreeSet::new();
        let constraints = Constraints {
            max_weight_kg: Some(0.1),
            ..Constraints::default()
        };
        let report = evaluate_constraints(&subject(&roles), &constraints, false);
        assert!(!report.passes);
        assert!(report.warnings.is_empty());
    }
}
