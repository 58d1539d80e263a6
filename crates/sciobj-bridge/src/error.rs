//! Error types for the Credential Bridge

use thiserror::Error;

use crate::types::CredentialKind;

/// Result type for Credential Bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while extracting or resolving a credential
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Neither credential field was present in the request metadata
    #[error("Missing credential: provide an access token or a user API token")]
    MissingCredential,

    /// Introspection of a delegated token did not yield an identity
    #[error("Identity resolution failed: {0}")]
    IdentityResolutionFailed(String),

    /// No API token matches the presented secret
    #[error("Unknown API token")]
    UnknownToken,

    /// The token backend could not be queried
    #[error("Token lookup failed: {0}")]
    TokenLookupFailed(String),

    /// No handler registered for the credential kind
    #[error("No handler registered for credential kind: {0}")]
    NoHandler(CredentialKind),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::IdentityResolutionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::IdentityResolutionFailed(err.to_string())
    }
}
