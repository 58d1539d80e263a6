//! Credential extraction from request metadata

use http::HeaderMap;
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::types::{Credential, CredentialKind};

/// Metadata field carrying a delegated (external provider) token
pub const ACCESS_TOKEN_FIELD: &str = "accesstoken";

/// Metadata field carrying a locally issued API token
pub const API_TOKEN_FIELD: &str = "userapitoken";

/// Extract the caller's credential from request metadata
///
/// The two fields are mutually exclusive in intended use. If a caller sends
/// both, the delegated token wins and the API token is ignored. Empty or
/// non-text values count as absent.
pub fn extract(metadata: &HeaderMap) -> Result<Credential> {
    if let Some(token) = field(metadata, ACCESS_TOKEN_FIELD) {
        if field(metadata, API_TOKEN_FIELD).is_some() {
            debug!("Both credential fields present, using the access token");
        }
        return Ok(Credential::new(token, CredentialKind::ExternalDelegated));
    }

    if let Some(token) = field(metadata, API_TOKEN_FIELD) {
        return Ok(Credential::new(token, CredentialKind::LocalApiToken));
    }

    Err(BridgeError::MissingCredential)
}

fn field<'a>(metadata: &'a HeaderMap, name: &str) -> Option<&'a str> {
    metadata
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
