//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use node_architect::catalog::Catalog;
use node_architect::estimate::{BuildSelection, EnvironmentProfile, FactorTables};
use node_architect::mission::Mission;
use node_architect::workspace::Workspace;

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The fixture component catalog.
pub fn catalog() -> Catalog {
    Catalog::from_path(&fixture("catalog.json")).expect("fixture catalog should load")
}

/// A build selection from `tests/fixtures/builds`.
pub fn build(name: &str) -> BuildSelection {
    BuildSelection::from_path(&fixture(&format!("builds/{name}.json")))
        .expect("fixture build should parse")
}

/// A workspace over the fixture catalog with default tables and environment.
pub fn workspace(mission: &str) -> Workspace {
    Workspace::new(
        catalog(),
        FactorTables::default(),
        EnvironmentProfile::default(),
        Mission::named(mission),
    )
}

/// Evaluates each named fixture build and saves it under `name`.
pub fn workspace_with_designs(mission: &str, builds: &[(&str, &str)]) -> Workspace {
    let mut ws = workspace(mission);
    for (file, name) in builds {
        ws.evaluate(&build(file)).expect("fixture build should evaluate");
        ws.save_design(name, "", Default::default())
            .expect("save should succeed after evaluate");
    }
    ws
}
