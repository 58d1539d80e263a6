//! Token and authorization check handlers

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use sciobj_bridge::CredentialKind;
use sciobj_core::{ApiToken, ResourceKind, Right, TokenSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;

/// Request to issue an API token
#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub rights: BTreeSet<Right>,
    #[serde(default = "default_scope")]
    pub scope: ResourceKind,
}

fn default_scope() -> ResourceKind {
    ResourceKind::Project
}

/// Issue an API token for the caller
///
/// POST /v1/tokens
///
/// Requires a delegated access token, so an API token cannot mint another.
/// The response is the only time the secret is returned.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<IssueTokenRequest>,
) -> Result<(StatusCode, Json<ApiToken>), ApiError> {
    let (owner, kind) = state.engine.identify_with_kind(&headers).await?;
    if kind != CredentialKind::ExternalDelegated {
        return Err(ApiError::Forbidden);
    }

    if request.rights.is_empty() {
        return Err(ApiError::BadRequest("at least one right is required".into()));
    }

    let token = state.tokens.issue(owner, request.rights, request.scope).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// List the caller's tokens without secrets
///
/// GET /v1/tokens
pub async fn list_tokens(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<TokenSummary>>, ApiError> {
    let owner = state.engine.identify(&headers).await?;
    Ok(Json(state.tokens.list_for(&owner).await?))
}

/// Query for an authorization check
#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub kind: String,
    pub id: String,
    pub right: String,
}

/// Authorization check response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
}

/// Check a right without performing any operation
///
/// GET /v1/authorize?kind=&id=&right=
///
/// A check that could not be evaluated reports `allowed: false`, same as a
/// denial.
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Json<AuthorizeResponse>, ApiError> {
    let right: Right = query.right.parse()?;

    let decision = state
        .engine
        .authorize_named(&headers, &query.kind, &query.id, right)
        .await?;

    Ok(Json(AuthorizeResponse {
        allowed: decision.is_allowed(),
    }))
}
