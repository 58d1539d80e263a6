//! Mock Credential Handler
//!
//! For testing purposes - resolves delegated tokens without an identity provider.

use async_trait::async_trait;
use sciobj_core::Identity;

use crate::bridge::CredentialHandler;
use crate::error::{BridgeError, Result};
use crate::types::{CredentialKind, Resolved};

/// Mock delegated-token handler for testing
///
/// Accepts tokens in the format:
/// - "identity" - Resolves to that identity
/// - "FAIL:message" - Fails introspection with the given message
pub struct MockHandler;

impl MockHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialHandler for MockHandler {
    fn credential_kind(&self) -> CredentialKind {
        CredentialKind::ExternalDelegated
    }

    fn description(&self) -> &str {
        "mock credential handler"
    }

    async fn resolve(&self, raw_token: &str) -> Result<Resolved> {
        if let Some(message) = raw_token.strip_prefix("FAIL:") {
            return Err(BridgeError::IdentityResolutionFailed(message.to_string()));
        }

        if raw_token.is_empty() {
            return Err(BridgeError::IdentityResolutionFailed(
                "mock token cannot be empty".into(),
            ));
        }

        Ok(Resolved::Identity(Identity::new(raw_token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_token() {
        let handler = MockHandler::new();
        let resolved = handler.resolve("alice").await.unwrap();
        assert_eq!(resolved, Resolved::Identity(Identity::new("alice")));
    }

    #[tokio::test]
    async fn test_explicit_failure() {
        let handler = MockHandler::new();
        match handler.resolve("FAIL:idp down").await.unwrap_err() {
            BridgeError::IdentityResolutionFailed(msg) => assert_eq!(msg, "idp down"),
            other => panic!("Expected IdentityResolutionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_token() {
        let handler = MockHandler::new();
        assert!(handler.resolve("").await.is_err());
    }
}
