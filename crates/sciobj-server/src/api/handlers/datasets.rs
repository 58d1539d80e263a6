//! Dataset and dataset version handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use sciobj_core::{Dataset, DatasetVersionEntry, ProjectId, ResourceKind, Right, Stage, VersionKey};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::state::AppState;

/// Request to create a dataset
#[derive(Debug, Deserialize)]
pub struct CreateDatasetRequest {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub dataset_type: String,
}

/// Request to release a dataset version
#[derive(Debug, Deserialize)]
pub struct ReleaseVersionRequest {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub stage: Stage,
    #[serde(default)]
    pub object_group_ids: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// POST /v1/datasets
///
/// Project rights are checked by id alone, so the store refuses a dataset
/// whose project does not exist (404).
pub async fn create_dataset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateDatasetRequest>,
) -> Result<(StatusCode, Json<Dataset>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("dataset name must not be empty".into()));
    }
    state
        .require(&headers, ResourceKind::Project, &request.project_id, Right::Write)
        .await?;

    let dataset = Dataset::new(ProjectId::new(request.project_id), request.name, request.dataset_type);
    state.resources.insert_dataset(dataset.clone()).await?;

    info!(dataset_id = %dataset.id, project_id = %dataset.project_id, "Created dataset");
    Ok((StatusCode::CREATED, Json(dataset)))
}

/// GET /v1/datasets/{id}
pub async fn get_dataset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Dataset>, ApiError> {
    state.require(&headers, ResourceKind::Dataset, &id, Right::Read).await?;

    let dataset = state
        .resources
        .get_dataset(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("dataset {}", id)))?;
    Ok(Json(dataset))
}

/// GET /v1/datasets/{id}/versions
pub async fn list_dataset_versions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<DatasetVersionEntry>>, ApiError> {
    state.require(&headers, ResourceKind::Dataset, &id, Right::Read).await?;
    Ok(Json(state.releases.list_releases(&id).await?))
}

/// Release a new version of a dataset
///
/// POST /v1/datasets/{id}/versions
///
/// Every listed object group must belong to the dataset. The revision is
/// assigned here; callers cannot choose it.
pub async fn release_dataset_version(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<ReleaseVersionRequest>,
) -> Result<(StatusCode, Json<DatasetVersionEntry>), ApiError> {
    state.require(&headers, ResourceKind::Dataset, &id, Right::Write).await?;

    for group_id in &request.object_group_ids {
        let group = state.resources.get_object_group(group_id).await?;
        match group {
            Some(group) if group.dataset_id == id => {}
            Some(_) => {
                return Err(ApiError::BadRequest(format!(
                    "object group {} does not belong to dataset {}",
                    group_id, id
                )))
            }
            None => return Err(ApiError::BadRequest(format!("unknown object group {}", group_id))),
        }
    }

    let key = VersionKey::new(id, request.major, request.minor, request.patch, request.stage);
    let entry = state
        .revisions
        .release(&key, request.object_group_ids, request.metadata)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /v1/dataset-versions/{id}
pub async fn get_dataset_version(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DatasetVersionEntry>, ApiError> {
    state
        .require(&headers, ResourceKind::DatasetVersion, &id, Right::Read)
        .await?;

    let entry = state
        .releases
        .get_release(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("dataset version {}", id)))?;
    Ok(Json(entry))
}
