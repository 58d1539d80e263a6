//! Project handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use sciobj_core::{Dataset, Identity, Project, ProjectId, ResourceKind, Right};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::storage::ProjectDeletion;

/// Request to create a project
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Request to add a member to a project
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub identity: String,
    pub rights: BTreeSet<Right>,
}

/// Create a project owned by the caller
///
/// POST /v1/projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("project name must not be empty".into()));
    }

    let creator = state.engine.identify(&headers).await?;
    let project = Project::new(creator, request.name, request.description);
    state.projects.insert_project(project.clone()).await?;

    info!(project_id = %project.id, "Created project");
    Ok((StatusCode::CREATED, Json(project)))
}

/// List the projects the caller belongs to
///
/// GET /v1/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Project>>, ApiError> {
    let identity = state.engine.identify(&headers).await?;
    Ok(Json(state.projects.list_projects_for(&identity).await?))
}

/// GET /v1/projects/{id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    state.require(&headers, ResourceKind::Project, &id, Right::Read).await?;

    let project = state
        .projects
        .get_project(&ProjectId::new(id.as_str()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {}", id)))?;
    Ok(Json(project))
}

/// Add a member or widen an existing member's rights
///
/// POST /v1/projects/{id}/members
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<Project>, ApiError> {
    if request.identity.trim().is_empty() {
        return Err(ApiError::BadRequest("member identity must not be empty".into()));
    }
    state.require(&headers, ResourceKind::Project, &id, Right::Write).await?;

    let project = state
        .projects
        .add_member(&ProjectId::new(id), Identity::new(request.identity), request.rights)
        .await?;
    Ok(Json(project))
}

/// GET /v1/projects/{id}/datasets
pub async fn list_project_datasets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<Dataset>>, ApiError> {
    state.require(&headers, ResourceKind::Project, &id, Right::Read).await?;
    Ok(Json(state.resources.list_project_datasets(&ProjectId::new(id)).await?))
}

/// Delete a project that no longer holds datasets
///
/// DELETE /v1/projects/{id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.require(&headers, ResourceKind::Project, &id, Right::Write).await?;

    let project_id = ProjectId::new(id);
    match state.projects.delete_project_if_empty(&project_id).await? {
        ProjectDeletion::Deleted => {
            info!(project_id = %project_id, "Deleted project");
            Ok(StatusCode::NO_CONTENT)
        }
        ProjectDeletion::NotFound => Err(ApiError::NotFound(format!("project {}", project_id))),
        ProjectDeletion::HasDatasets => Err(ApiError::Conflict(format!(
            "project {} still holds datasets",
            project_id
        ))),
    }
}
