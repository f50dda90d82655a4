//! The application context: catalog, tables, mission state and designs.
//!
//! The estimator itself is stateless. Everything that changes across user
//! actions (the last evaluation, active constraints, the design collection,
//! document extras carried from an import) lives here and nowhere else.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::config::ArchitectConfig;
use crate::design::NodeDesign;
use crate::error::WorkspaceError;
use crate::estimate::{
    BuildSelection, ConstraintReport, ConstraintSubject, Constraints, EnvironmentProfile,
    EvaluationResult, FactorTables, NodeConfig, Role, evaluate, evaluate_constraints,
};
use crate::mission::{
    ExportContext, IdAllocator, Mission, MissionProject, ProjectExtras, SchemaVersion,
    export_project, import_project,
};
use crate::store;

/// An evaluation plus its constraint check, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub constraints: ConstraintReport,
}

/// A saved design annotated with its constraint status.
#[derive(Debug, Clone, Serialize)]
pub struct DesignStatus<'a> {
    #[serde(flatten)]
    pub design: &'a NodeDesign,
    pub passes: bool,
    pub warnings: Vec<String>,
}

/// Editable fields of a saved design. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct DesignUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub mission: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
}

#[derive(Debug)]
pub struct Workspace {
    catalog: Catalog,
    tables: FactorTables,
    defaults: EnvironmentProfile,
    mission: Mission,
    constraints: Constraints,
    last: Option<(NodeConfig, EvaluationResult)>,
    designs: Vec<NodeDesign>,
    extras: ProjectExtras,
    ids: IdAllocator,
}

impl Workspace {
    pub fn new(catalog: Catalog, tables: FactorTables, defaults: EnvironmentProfile, mission: Mission) -> Self {
        Self {
            catalog,
            tables,
            defaults,
            mission,
            constraints: Constraints::default(),
            last: None,
            designs: Vec::new(),
            extras: ProjectExtras::default(),
            ids: IdAllocator::new(),
        }
    }

    /// Builds a workspace from loaded configuration and a catalog.
    pub fn from_config(config: &ArchitectConfig, catalog: Catalog) -> Self {
        Self::new(
            catalog,
            config.factors.clone(),
            config.environment.profile(),
            config.mission.to_mission(),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tables(&self) -> &FactorTables {
        &self.tables
    }

    pub fn environment_defaults(&self) -> &EnvironmentProfile {
        &self.defaults
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn set_mission(&mut self, mission: Mission) {
        self.mission = mission;
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: Constraints) {
        self.constraints = constraints;
    }

    pub fn designs(&self) -> &[NodeDesign] {
        &self.designs
    }

    pub fn design(&self, id: &str) -> Option<&NodeDesign> {
        self.designs.iter().find(|d| d.id == id)
    }

    pub fn extras(&self) -> &ProjectExtras {
        &self.extras
    }

    pub fn last_evaluation(&self) -> Option<&EvaluationResult> {
        self.last.as_ref().map(|(_, result)| result)
    }

    /// Resolves and evaluates a selection, caching it for `save_design`.
    ///
    /// Resolution warnings are folded into the result's warnings. On error
    /// the previous cached evaluation is kept.
    ///
    /// # Errors
    ///
    /// Returns the `EvaluationError` for a missing host, battery, or chain.
    pub fn evaluate(&mut self, selection: &BuildSelection) -> Result<EvaluationReport, WorkspaceError> {
        let resolved = NodeConfig::resolve(&self.catalog, selection, &self.defaults)?;
        let mut result = evaluate(&resolved.config, &self.tables)?;
        result.warnings.splice(0..0, resolved.warnings);

        let subject = ConstraintSubject {
            weight_kg: result.weight_kg,
            runtime_hours: result.runtime.adjusted_runtime_hours,
            roles: &result.suggested_roles,
        };
        let constraints = evaluate_constraints(&subject, &self.constraints, true);
        tracing::debug!(
            role = %result.recommended_role,
            runtime_h = result.runtime.adjusted_runtime_hours,
            passes = constraints.passes,
            "node evaluated"
        );

        self.last = Some((resolved.config, result.clone()));
        Ok(EvaluationReport { result, constraints })
    }

    /// Re-evaluates a saved design from its parts snapshot with the current
    /// tables and makes it the last evaluation, so it can be edited and
    /// saved again.
    ///
    /// # Errors
    ///
    /// `WorkspaceError::UnknownDesign` if `id` is not in the collection.
    pub fn reopen_design(&mut self, id: &str) -> Result<EvaluationReport, WorkspaceError> {
        let index = self.index_of(id)?;
        let config = self.designs[index].node_config();
        let result = evaluate(&config, &self.tables)?;
        let subject = ConstraintSubject {
            weight_kg: result.weight_kg,
            runtime_hours: result.runtime.adjusted_runtime_hours,
            roles: &self.designs[index].roles,
        };
        let constraints = evaluate_constraints(&subject, &self.constraints, true);
        self.last = Some((config, result.clone()));
        Ok(EvaluationReport { result, constraints })
    }

    /// Saves the last evaluation under `name`.
    ///
    /// The id is derived from the name, so saving the same name again
    /// replaces the earlier design in place. Empty `roles` fall back to the
    /// evaluation's suggested roles.
    ///
    /// # Errors
    ///
    /// `WorkspaceError::NoEvaluation` if nothing has been evaluated yet.
    pub fn save_design(
        &mut self,
        name: &str,
        notes: &str,
        roles: BTreeSet<Role>,
    ) -> Result<&NodeDesign, WorkspaceError> {
        let (config, result) = self.last.as_ref().ok_or(WorkspaceError::NoEvaluation)?;
        let id = self.ids.id_for_name(name);
        let mut design = NodeDesign::from_evaluation(id, name.to_string(), config, result, roles);
        design.notes = notes.to_string();
        design.mission = self.mission.name.clone();
        tracing::info!(id = %design.id, name, "design saved");
        Ok(self.upsert(design))
    }

    fn upsert(&mut self, design: NodeDesign) -> &NodeDesign {
        let index = match self.designs.iter().position(|d| d.id == design.id) {
            Some(index) => {
                self.designs[index] = design;
                index
            }
            None => {
                self.designs.push(design);
                self.designs.len() - 1
            }
        };
        &self.designs[index]
    }

    fn index_of(&self, id: &str) -> Result<usize, WorkspaceError> {
        self.designs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| WorkspaceError::UnknownDesign(id.to_string()))
    }

    /// Copies a design under a new name and a fresh id.
    ///
    /// # Errors
    ///
    /// `WorkspaceError::UnknownDesign` if `id` is not in the collection.
    pub fn duplicate_design(&mut self, id: &str, new_name: &str) -> Result<&NodeDesign, WorkspaceError> {
        let index = self.index_of(id)?;
        let mut copy = self.designs[index].clone();
        let base = self.ids.id_for_name(new_name);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.designs.iter().any(|d| d.id == candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        copy.id = candidate;
        copy.name = new_name.to_string();
        self.designs.push(copy);
        Ok(&self.designs[self.designs.len() - 1])
    }

    /// Edits descriptive fields of a design. Estimates are not recomputed.
    ///
    /// # Errors
    ///
    /// `WorkspaceError::UnknownDesign` if `id` is not in the collection.
    pub fn update_design(&mut self, id: &str, update: DesignUpdate) -> Result<&NodeDesign, WorkspaceError> {
        let index = self.index_of(id)?;
        let design = &mut self.designs[index];
        if let Some(name) = update.name {
            design.name = name;
        }
        if let Some(notes) = update.notes {
            design.notes = notes;
        }
        if let Some(mission) = update.mission {
            design.mission = mission;
        }
        if let Some(roles) = update.roles {
            design.roles = roles;
        }
        Ok(design)
    }

    /// # Errors
    ///
    /// `WorkspaceError::UnknownDesign` if `id` is not in the collection.
    pub fn delete_design(&mut self, id: &str) -> Result<NodeDesign, WorkspaceError> {
        let index = self.index_of(id)?;
        tracing::info!(id, "design deleted");
        Ok(self.designs.remove(index))
    }

    /// Every design with its pass/fail status against the active constraints.
    pub fn designs_with_status(&self) -> Vec<DesignStatus<'_>> {
        self.designs
            .iter()
            .map(|design| {
                let report = design.check(&self.constraints, true);
                DesignStatus {
                    design,
                    passes: report.passes,
                    warnings: report.warnings,
                }
            })
            .collect()
    }

    /// Builds a MissionProject document from the current collection.
    pub fn export_project(&self, generated_at: DateTime<Utc>, schema: SchemaVersion) -> MissionProject {
        let ctx = ExportContext {
            mission: self.mission.clone(),
            environment: self.defaults.clone(),
            constraints: self.constraints.clone(),
            extras: self.extras.clone(),
            generated_at,
            schema,
        };
        export_project(&self.designs, &ctx)
    }

    /// Replaces the collection with the nodes of `doc`.
    ///
    /// Mission, constraints and document extras are taken from the document
    /// as well. Environment defaults change only if the document has an
    /// `environment`. Returns the per-node warnings.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Import` when the document is malformed or no
    /// node resolves; the workspace is left untouched in that case.
    pub fn import_project(&mut self, doc: &Value) -> Result<Vec<String>, WorkspaceError> {
        let outcome = import_project(doc, &self.catalog, &self.tables, &self.defaults, &mut self.ids)?;
        self.designs = outcome.designs;
        self.mission = outcome.mission;
        self.constraints = outcome.constraints;
        if let Some(environment) = outcome.environment {
            self.defaults = environment;
        }
        self.extras = outcome.extras;
        Ok(outcome.warnings)
    }

    /// Replaces the collection with designs stored at `path`.
    ///
    /// Returns the warning if the file could not be used, in which case the
    /// collection is empty afterwards.
    pub fn load_designs(&mut self, path: &Path) -> Option<String> {
        let loaded = store::load_designs(path);
        self.designs = loaded.designs;
        loaded.warning
    }

    /// # Errors
    ///
    /// Returns `WorkspaceError::Store` if the write fails.
    pub fn save_designs(&self, path: &Path) -> Result<(), WorkspaceError> {
        store::save_designs(path, &self.designs)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Antenna, Battery, Compute, Radio};
    use crate::estimate::ChainSelection;

    fn workspace() -> Workspace {
        let catalog = Catalog {
            compute: vec![Compute {
                id: "pi5".into(),
                power_w_idle: Some(4.5),
                power_w_load: Some(11.0),
                weight_kg: Some(0.1),
                ..Compute::default()
            }],
            radios: vec![Radio {
                id: "lora".into(),
                radio_type: "lora".into(),
                bands: vec!["915".into()],
                ..Radio::default()
            }],
            antennas: vec![Antenna {
                id: "whip".into(),
                ..Antenna::default()
            }],
            batteries: vec![Battery {
                id: "pack".into(),
                capacity_wh: Some(77.5),
                weight_kg: Some(0.5),
                ..Battery::default()
            }],
            sensors: Vec::new(),
        };
        Workspace::new(
            catalog,
            FactorTables::default(),
            EnvironmentProfile::default(),
            Mission::named("Ridge"),
        )
    }

    fn selection() -> BuildSelection {
        BuildSelection {
            host: Some("pi5".into()),
            battery: Some("pack".into()),
            rf_chains: vec![ChainSelection {
                radio: "lora".into(),
                antenna: "whip".into(),
            }],
            ..BuildSelection::default()
        }
    }

    #[test]
    fn save_requires_an_evaluation() {
        let mut ws = workspace();
        assert!(matches!(
            ws.save_design("A", "", BTreeSet::new()),
            Err(WorkspaceError::NoEvaluation)
        ));
    }

    #[test]
    fn saving_the_same_name_replaces() {
        let mut ws = workspace();
        ws.evaluate(&selection()).expect("evaluates");
        ws.save_design("Ridge Relay", "first", BTreeSet::new()).expect("saves");
        ws.save_design("Ridge Relay", "second", BTreeSet::new()).expect("saves");
        assert_eq!(ws.designs().len(), 1);
        assert_eq!(ws.designs()[0].notes, "second");
        assert_eq!(ws.designs()[0].mission, "Ridge");
    }

    #[test]
    fn duplicate_gets_a_fresh_id() {
        let mut ws = workspace();
        ws.evaluate(&selection()).expect("evaluates");
        ws.save_design("A", "", BTreeSet::new()).expect("saves");
        let id = ws.duplicate_design("node-a", "A").expect("duplicates").id.clone();
        assert_eq!(id, "node-a-2");
        assert_eq!(ws.designs().len(), 2);
    }

    #[test]
    fn failed_evaluation_keeps_previous_cache() {
        let mut ws = workspace();
        ws.evaluate(&selection()).expect("evaluates");
        let mut bad = selection();
        bad.host = Some("pi9".into());
        assert!(ws.evaluate(&bad).is_err());
        assert!(ws.last_evaluation().is_some());
    }

    #[test]
    fn status_follows_constraints() {
        let mut ws = workspace();
        ws.evaluate(&selection()).expect("evaluates");
        ws.save_design("A", "", BTreeSet::new()).expect("saves");
        ws.set_constraints(Constraints {
            max_weight_kg: Some(0.65),
            ..Constraints::default()
        });
        assert!(ws.designs_with_status()[0].passes);
        ws.set_constraints(Constraints {
            max_weight_kg: Some(0.59),
            ..Constraints::default()
        });
        let status = ws.designs_with_status();
        assert!(!status[0].passes);
        assert_eq!(status[0].warnings.len(), 1);
    }

    #[test]
    fn update_and_delete() {
        let mut ws = workspace();
        ws.evaluate(&selection()).expect("evaluates");
        ws.save_design("A", "", BTreeSet::new()).expect("saves");
        let update = DesignUpdate {
            notes: Some("north ridge".into()),
            roles: Some([Role::Relay].into_iter().collect()),
            ..DesignUpdate::default()
        };
        let design = ws.update_design("node-a", update).expect("updates");
        assert_eq!(design.notes, "north ridge");
        assert!(design.roles.contains(&Role::Relay));
        ws.delete_design("node-a").expect("deletes");
        assert!(matches!(
            ws.delete_design("node-a"),
            Err(WorkspaceError::UnknownDesign(_))
        ));
    }
}
