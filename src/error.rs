//! Error types for each boundary of the engine.
//!
//! Soft data gaps (missing draw figures, missing weights, unknown sensor ids)
//! are never errors here; they travel as `warnings` on the returned values.

use std::io;

use thiserror::Error;

/// Errors raised while loading the component catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("cannot read catalog \"{path}\": {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entries of the same kind share an id.
    #[error("duplicate {kind} id \"{id}\" in catalog")]
    DuplicateId {
        /// Catalog array the duplicate was found in.
        kind: &'static str,
        /// The repeated id.
        id: String,
    },
}

/// Blocking validation failures for a node evaluation.
///
/// No partial result is produced when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// No compute host selected, or the selected id is unknown.
    #[error("no compute host selected{}", unknown_suffix(.0))]
    MissingCompute(Option<String>),

    /// No battery selected, or the selected id is unknown.
    #[error("no battery selected{}", unknown_suffix(.0))]
    MissingBattery(Option<String>),

    /// Every RF chain was missing a radio or antenna.
    #[error("at least one RF chain with a known radio and antenna is required")]
    NoRfChain,
}

fn unknown_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" (unknown id \"{id}\")"),
        None => String::new(),
    }
}

/// Hard failures while importing a MissionProject document.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload is not JSON, or not a JSON object.
    #[error("malformed MissionProject document: {0}")]
    Malformed(String),

    /// Not a single node could be resolved against the catalog.
    #[error("no usable nodes in MissionProject document ({} warning(s))", .warnings.len())]
    NoUsableNodes {
        /// Per-node reasons collected while importing.
        warnings: Vec<String>,
    },
}

/// Errors persisting the design collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing the collection failed.
    #[error("cannot write designs to \"{path}\": {message}")]
    Write {
        /// Destination path.
        path: String,
        /// Rendered cause.
        message: String,
    },

    /// Serializing the collection failed.
    #[error("cannot serialize designs: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by [`crate::workspace::Workspace`] operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// `save_design` was called before any successful evaluation.
    #[error("nothing to save: evaluate a node first")]
    NoEvaluation,

    /// The referenced design does not exist.
    #[error("unknown design \"{0}\"")]
    UnknownDesign(String),

    /// Evaluation was rejected.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Import was rejected; the design collection is untouched.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Persisting the collection failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_compute_names_unknown_id() {
        let err = EvaluationError::MissingCompute(Some("pi9".to_string()));
        assert_eq!(err.to_string(), "no compute host selected (unknown id \"pi9\")");
        let err = EvaluationError::MissingBattery(None);
        assert_eq!(err.to_string(), "no battery selected");
    }

    #[test]
    fn no_usable_nodes_counts_warnings() {
        let err = ImportError::NoUsableNodes {
            warnings: vec!["a".into(), "b".into()],
        };
        assert!(err.to_string().contains("2 warning(s)"));
    }
}
