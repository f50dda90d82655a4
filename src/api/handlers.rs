//! Request handlers for the API endpoints.

use std::sync::MutexGuard;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;

use super::SharedWorkspace;
use super::types::{
    DesignSummary, DesignsResponse, ErrorResponse, ImportResponse, ProjectQuery, SaveDesignRequest,
};
use crate::error::{ImportError, WorkspaceError};
use crate::estimate::{BuildSelection, Constraints};
use crate::mission::{MissionProject, SchemaVersion};
use crate::workspace::{EvaluationReport, Workspace};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            warnings: Vec::new(),
        }),
    )
}

fn lock(state: &SharedWorkspace) -> Result<MutexGuard<'_, Workspace>, ApiError> {
    state
        .lock()
        .map_err(|_| error(StatusCode::INTERNAL_SERVER_ERROR, "workspace lock poisoned"))
}

fn workspace_error(err: WorkspaceError) -> ApiError {
    match err {
        WorkspaceError::NoEvaluation => error(StatusCode::CONFLICT, err.to_string()),
        WorkspaceError::UnknownDesign(_) => error(StatusCode::NOT_FOUND, err.to_string()),
        WorkspaceError::Evaluation(_) => error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        WorkspaceError::Import(ImportError::NoUsableNodes { warnings }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "no usable nodes in MissionProject document".to_string(),
                warnings,
            }),
        ),
        WorkspaceError::Import(_) => error(StatusCode::BAD_REQUEST, err.to_string()),
        WorkspaceError::Store(_) => error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// `POST /evaluate` → 200 + `EvaluationReport`, or 422 when the selection
/// has no usable host, battery or chain.
pub async fn evaluate(
    State(state): State<SharedWorkspace>,
    Json(selection): Json<BuildSelection>,
) -> Result<Json<EvaluationReport>, ApiError> {
    let mut ws = lock(&state)?;
    ws.evaluate(&selection).map(Json).map_err(workspace_error)
}

/// `GET /designs` → 200 + designs annotated with constraint status.
pub async fn list_designs(State(state): State<SharedWorkspace>) -> Result<Json<DesignsResponse>, ApiError> {
    let ws = lock(&state)?;
    Ok(Json(DesignsResponse {
        mission: ws.mission().name.clone(),
        constraints: ws.constraints().clone(),
        designs: ws.designs_with_status().into_iter().map(DesignSummary::from).collect(),
    }))
}

/// `POST /designs` → 201 + the saved design, or 409 before any evaluation.
pub async fn save_design(
    State(state): State<SharedWorkspace>,
    Json(request): Json<SaveDesignRequest>,
) -> Result<(StatusCode, Json<DesignSummary>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "design name must not be empty"));
    }
    let mut ws = lock(&state)?;
    let id = ws
        .save_design(&request.name, &request.notes, request.roles)
        .map_err(workspace_error)?
        .id
        .clone();
    let summary = ws
        .designs_with_status()
        .into_iter()
        .find(|s| s.design.id == id)
        .map(DesignSummary::from)
        .ok_or_else(|| error(StatusCode::INTERNAL_SERVER_ERROR, "saved design missing"))?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// `DELETE /designs/{id}` → 204, or 404 for an unknown id.
pub async fn delete_design(
    State(state): State<SharedWorkspace>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut ws = lock(&state)?;
    ws.delete_design(&id).map_err(workspace_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /constraints` → 200 + the constraints now active.
pub async fn set_constraints(
    State(state): State<SharedWorkspace>,
    Json(constraints): Json<Constraints>,
) -> Result<Json<Constraints>, ApiError> {
    let mut ws = lock(&state)?;
    ws.set_constraints(constraints);
    Ok(Json(ws.constraints().clone()))
}

/// `GET /project` → 200 + MissionProject document.
/// `GET /project?legacy=true` → the v1 layout.
pub async fn export_project(
    State(state): State<SharedWorkspace>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<MissionProject>, ApiError> {
    let ws = lock(&state)?;
    let schema = if query.legacy {
        SchemaVersion::LegacyV1
    } else {
        SchemaVersion::V2
    };
    Ok(Json(ws.export_project(Utc::now(), schema)))
}

/// `POST /project` → 200 + import summary; 422 with per-node warnings when
/// nothing resolves. The collection is untouched on failure.
pub async fn import_project(
    State(state): State<SharedWorkspace>,
    Json(doc): Json<Value>,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut ws = lock(&state)?;
    let warnings = ws.import_project(&doc).map_err(workspace_error)?;
    Ok(Json(ImportResponse {
        imported: ws.designs().len(),
        warnings,
    }))
}
