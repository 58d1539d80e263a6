//! Error types for authorization, token issuance and revision assignment

use sciobj_bridge::BridgeError;
use sciobj_core::{CoreError, ResourceKind, VersionKey};
use thiserror::Error;

use crate::storage::StorageError;

/// Error surfaced by an authorization check
///
/// These are failures to *evaluate* a request. A well-formed request that is
/// simply not permitted is a [`sciobj_core::Decision`], not an error.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    #[error("Missing credential: neither an access token nor an API token was supplied")]
    MissingCredential,

    #[error("Identity resolution failed: {0}")]
    IdentityResolutionFailed(String),

    #[error("Unknown API token")]
    UnknownToken,

    #[error("{kind} not found: {id}")]
    ResourceNotFound { kind: ResourceKind, id: String },

    #[error("Unsupported resource kind: {0}")]
    UnsupportedResource(String),

    #[error("Internal lookup failure: {0}")]
    InternalLookupFailure(String),
}

impl From<BridgeError> for AuthError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::MissingCredential => AuthError::MissingCredential,
            BridgeError::IdentityResolutionFailed(msg) => AuthError::IdentityResolutionFailed(msg),
            BridgeError::UnknownToken => AuthError::UnknownToken,
            BridgeError::TokenLookupFailed(msg) => AuthError::InternalLookupFailure(msg),
            BridgeError::NoHandler(kind) => {
                AuthError::IdentityResolutionFailed(format!("no handler for {} credentials", kind))
            }
            BridgeError::InvalidConfig(msg) => AuthError::InternalLookupFailure(msg),
        }
    }
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedResource(kind) => AuthError::UnsupportedResource(kind),
            other => AuthError::InternalLookupFailure(other.to_string()),
        }
    }
}

/// Error from issuing or reading API tokens
#[derive(Error, Debug, Clone)]
pub enum TokenError {
    #[error("Invalid token request: {0}")]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error from revision assignment
#[derive(Error, Debug, Clone)]
pub enum RevisionError {
    #[error("Could not reserve a revision for {key} after {attempts} attempts")]
    Conflict { key: VersionKey, attempts: u32 },

    #[error("Revision overflow: {0}")]
    Overflow(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciobj_bridge::CredentialKind;

    #[test]
    fn test_bridge_error_mapping() {
        assert!(matches!(
            AuthError::from(BridgeError::MissingCredential),
            AuthError::MissingCredential
        ));
        assert!(matches!(
            AuthError::from(BridgeError::TokenLookupFailed("reset".into())),
            AuthError::InternalLookupFailure(_)
        ));
        assert!(matches!(
            AuthError::from(BridgeError::NoHandler(CredentialKind::LocalApiToken)),
            AuthError::IdentityResolutionFailed(_)
        ));
    }

    #[test]
    fn test_core_error_mapping() {
        assert!(matches!(
            AuthError::from(CoreError::UnsupportedResource("bucket".into())),
            AuthError::UnsupportedResource(k) if k == "bucket"
        ));
    }
}
