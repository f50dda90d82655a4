//! Deterministic node estimation: power, runtime, range, capabilities, role,
//! and constraint checks.

/// Capability tags, suggested roles and advisory notes.
pub mod capability;
pub mod constraints;
pub mod engine;
/// Replaceable environment and capacity lookup tables.
pub mod factors;
pub mod power;
/// Per-chain link range estimation.
pub mod range;
pub mod role;
/// Id-level build descriptions resolved against the catalog.
pub mod selection;
pub mod types;

pub use constraints::{ConstraintReport, ConstraintSubject, Constraints, evaluate_constraints};
pub use engine::{EvaluationResult, evaluate};
pub use factors::FactorTables;
pub use power::RuntimeBreakdown;
pub use range::{ChainRange, RangeEstimate};
pub use selection::{BuildSelection, ChainSelection, Resolved};
pub use types::{
    AltitudeBand, Environment, EnvironmentProfile, Location, NodeConfig, RfChain, Role,
    TemperatureBand,
};
