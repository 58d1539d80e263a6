//! API Token Credential Handler
//!
//! Resolves locally issued API tokens to the grant embedded in the token
//! record. No external call is made.

use async_trait::async_trait;
use sciobj_core::TokenGrant;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::bridge::CredentialHandler;
use crate::error::{BridgeError, Result};
use crate::types::{CredentialKind, Resolved};

/// Backend trait for token grant lookup
///
/// Implement this trait over whatever stores the issued tokens.
#[async_trait]
pub trait TokenGrantBackend: Send + Sync {
    /// Find the grant for a secret
    ///
    /// `Ok(None)` means no usable token matches. `Err` is reserved for
    /// backend failures.
    async fn find_grant(&self, secret: &str) -> Result<Option<TokenGrant>>;

    /// Get a description of this backend
    fn description(&self) -> &str {
        "token grant backend"
    }
}

#[async_trait]
impl<B: TokenGrantBackend + ?Sized> TokenGrantBackend for Arc<B> {
    async fn find_grant(&self, secret: &str) -> Result<Option<TokenGrant>> {
        (**self).find_grant(secret).await
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}

/// In-memory token backend for testing
pub struct InMemoryTokenBackend {
    grants: RwLock<HashMap<String, TokenGrant>>,
}

impl InMemoryTokenBackend {
    pub fn new() -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
        }
    }

    /// Register a grant under a secret
    pub fn register(&self, secret: impl Into<String>, grant: TokenGrant) {
        if let Ok(mut grants) = self.grants.write() {
            grants.insert(secret.into(), grant);
        }
    }

    /// Remove a secret
    pub fn remove(&self, secret: &str) -> bool {
        self.grants
            .write()
            .map(|mut grants| grants.remove(secret).is_some())
            .unwrap_or(false)
    }
}

impl Default for InMemoryTokenBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenGrantBackend for InMemoryTokenBackend {
    async fn find_grant(&self, secret: &str) -> Result<Option<TokenGrant>> {
        let grants = self
            .grants
            .read()
            .map_err(|e| BridgeError::TokenLookupFailed(e.to_string()))?;
        Ok(grants.get(secret).cloned())
    }

    fn description(&self) -> &str {
        "in-memory token backend"
    }
}

/// API Token Credential Handler
pub struct ApiTokenHandler {
    backend: Box<dyn TokenGrantBackend>,
}

impl ApiTokenHandler {
    pub fn new<B: TokenGrantBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }
}

#[async_trait]
impl CredentialHandler for ApiTokenHandler {
    fn credential_kind(&self) -> CredentialKind {
        CredentialKind::LocalApiToken
    }

    fn description(&self) -> &str {
        "local API token handler"
    }

    async fn resolve(&self, raw_token: &str) -> Result<Resolved> {
        debug!(backend = self.backend.description(), "Looking up API token");

        let grant = self
            .backend
            .find_grant(raw_token)
            .await?
            .ok_or(BridgeError::UnknownToken)?;

        Ok(Resolved::Grant(grant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciobj_core::{Identity, ResourceKind, Right};

    fn grant(owner: &str, rights: &[Right]) -> TokenGrant {
        TokenGrant::new(Identity::new(owner), rights.iter().copied(), ResourceKind::Project)
    }

    #[tokio::test]
    async fn test_in_memory_backend() {
        let backend = InMemoryTokenBackend::new();
        backend.register("tok_123", grant("alice", &[Right::Read]));

        let found = backend.find_grant("tok_123").await.unwrap().unwrap();
        assert_eq!(found.owner.as_str(), "alice");
        assert!(found.has_right(Right::Read));
        assert!(!found.has_right(Right::Write));

        assert!(backend.find_grant("tok_other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let handler = ApiTokenHandler::new(InMemoryTokenBackend::new());
        let result = handler.resolve("missing").await;
        assert!(matches!(result, Err(BridgeError::UnknownToken)));
    }

    #[tokio::test]
    async fn test_handler_returns_grant() {
        let backend = Arc::new(InMemoryTokenBackend::new());
        backend.register("tok_live", grant("org-acme", &[Right::Read, Right::Write]));

        let handler = ApiTokenHandler::new(backend.clone());
        let resolved = handler.resolve("tok_live").await.unwrap();

        match resolved {
            Resolved::Grant(g) => {
                assert_eq!(g.owner.as_str(), "org-acme");
                assert!(g.has_right(Right::Write));
            }
            other => panic!("expected grant, got {:?}", other),
        }

        assert!(backend.remove("tok_live"));
        assert!(matches!(
            handler.resolve("tok_live").await,
            Err(BridgeError::UnknownToken)
        ));
    }

    struct FailingBackend;

    #[async_trait]
    impl TokenGrantBackend for FailingBackend {
        async fn find_grant(&self, _secret: &str) -> Result<Option<TokenGrant>> {
            Err(BridgeError::TokenLookupFailed("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_unknown_token() {
        let handler = ApiTokenHandler::new(FailingBackend);
        let result = handler.resolve("tok").await;
        assert!(matches!(result, Err(BridgeError::TokenLookupFailed(_))));
    }
}
