//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::core::{AuthError, RevisionError, TokenError};
use crate::storage::StorageError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Denied and unevaluable checks render identically
    #[error("Access denied")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential
            | AuthError::IdentityResolutionFailed(_)
            | AuthError::UnknownToken => ApiError::Unauthorized(err.to_string()),
            AuthError::ResourceNotFound { .. } => ApiError::NotFound(err.to_string()),
            AuthError::UnsupportedResource(_) => ApiError::BadRequest(err.to_string()),
            AuthError::InternalLookupFailure(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            StorageError::AlreadyExists(what) => ApiError::Conflict(format!("{} already exists", what)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(e) => ApiError::BadRequest(e.to_string()),
            TokenError::Storage(e) => e.into(),
        }
    }
}

impl From<RevisionError> for ApiError {
    fn from(err: RevisionError) -> Self {
        match err {
            RevisionError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            RevisionError::Overflow(_) => ApiError::Conflict(err.to_string()),
            RevisionError::Storage(e) => e.into(),
        }
    }
}

impl From<sciobj_core::CoreError> for ApiError {
    fn from(err: sciobj_core::CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
