//! Object group and object handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use sciobj_core::{ObjectEntry, ObjectGroup, ResourceKind, Right};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::state::AppState;

/// One file in a new object group
#[derive(Debug, Deserialize)]
pub struct NewObject {
    pub filename: String,
    #[serde(default)]
    pub filetype: String,
    #[serde(default)]
    pub content_len: u64,
}

/// Request to create an object group
#[derive(Debug, Deserialize)]
pub struct CreateObjectGroupRequest {
    pub dataset_id: String,
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub objects: Vec<NewObject>,
}

/// POST /v1/object-groups
pub async fn create_object_group(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateObjectGroupRequest>,
) -> Result<(StatusCode, Json<ObjectGroup>), ApiError> {
    if request.objects.iter().any(|o| o.filename.trim().is_empty()) {
        return Err(ApiError::BadRequest("object filename must not be empty".into()));
    }

    state
        .require(&headers, ResourceKind::Dataset, &request.dataset_id, Right::Write)
        .await?;

    // Storage keys are laid out under the owning project
    let dataset = state
        .resources
        .get_dataset(&request.dataset_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("dataset {}", request.dataset_id)))?;

    let files = request
        .objects
        .into_iter()
        .map(|o| (o.filename, o.filetype, o.content_len))
        .collect();

    let group = ObjectGroup::new(
        &dataset.project_id,
        dataset.id,
        request.name,
        request.labels,
        files,
    );
    state.resources.insert_object_group(group.clone()).await?;

    info!(group_id = %group.id, objects = group.objects.len(), "Created object group");
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /v1/object-groups/{id}
pub async fn get_object_group(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ObjectGroup>, ApiError> {
    state.require(&headers, ResourceKind::ObjectGroup, &id, Right::Read).await?;

    let group = state
        .resources
        .get_object_group(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("object group {}", id)))?;
    Ok(Json(group))
}

/// GET /v1/objects/{id}
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ObjectEntry>, ApiError> {
    state.require(&headers, ResourceKind::Object, &id, Right::Read).await?;

    let object = state
        .resources
        .get_object(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("object {}", id)))?;
    Ok(Json(object))
}
