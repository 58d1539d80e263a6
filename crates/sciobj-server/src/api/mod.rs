//! API module for the server

pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration for browser-based clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Projects
        .route("/v1/projects", post(handlers::create_project).get(handlers::list_projects))
        .route("/v1/projects/{id}", get(handlers::get_project).delete(handlers::delete_project))
        .route("/v1/projects/{id}/members", post(handlers::add_member))
        .route("/v1/projects/{id}/datasets", get(handlers::list_project_datasets))
        // Datasets and versions
        .route("/v1/datasets", post(handlers::create_dataset))
        .route("/v1/datasets/{id}", get(handlers::get_dataset))
        .route(
            "/v1/datasets/{id}/versions",
            get(handlers::list_dataset_versions).post(handlers::release_dataset_version),
        )
        .route("/v1/dataset-versions/{id}", get(handlers::get_dataset_version))
        // Object groups and objects
        .route("/v1/object-groups", post(handlers::create_object_group))
        .route("/v1/object-groups/{id}", get(handlers::get_object_group))
        .route("/v1/objects/{id}", get(handlers::get_object))
        // Tokens and authorization
        .route("/v1/tokens", post(handlers::issue_token).get(handlers::list_tokens))
        .route("/v1/authorize", get(handlers::authorize))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
