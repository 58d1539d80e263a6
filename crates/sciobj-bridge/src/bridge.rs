//! Identity Resolver - routes credentials to the appropriate handler

use async_trait::async_trait;
use sciobj_core::Identity;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{BridgeError, Result};
use crate::types::{Credential, CredentialKind, Resolved};

/// Trait for credential handlers
///
/// Each handler resolves one kind of credential into an identity or a grant.
/// Handlers never perform project membership checks.
#[async_trait]
pub trait CredentialHandler: Send + Sync {
    /// Get the kind of credential this handler processes
    fn credential_kind(&self) -> CredentialKind;

    /// Resolve a raw token
    ///
    /// # Arguments
    /// * `raw_token` - The token exactly as presented by the caller
    ///
    /// # Returns
    /// * `Ok(Resolved)` - Identity or grant behind the token
    /// * `Err(BridgeError)` - If the token cannot be resolved
    async fn resolve(&self, raw_token: &str) -> Result<Resolved>;

    /// Get a description of this handler (for logging)
    fn description(&self) -> &str {
        "credential handler"
    }
}

/// Identity Resolver - routes credentials to handlers by kind
pub struct IdentityResolver {
    handlers: HashMap<CredentialKind, Arc<dyn CredentialHandler>>,
}

impl IdentityResolver {
    /// Create a resolver with no handlers
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a credential handler, replacing any handler for the same kind
    pub fn register_handler<H: CredentialHandler + 'static>(&mut self, handler: H) {
        let kind = handler.credential_kind();
        info!(
            credential_kind = %kind,
            description = handler.description(),
            "Registered credential handler"
        );
        self.handlers.insert(kind, Arc::new(handler));
    }

    /// Resolve a credential to an identity or a grant
    pub async fn resolve(&self, credential: &Credential) -> Result<Resolved> {
        let handler = self.handlers.get(&credential.kind).ok_or_else(|| {
            warn!(credential_kind = %credential.kind, "No handler for credential kind");
            BridgeError::NoHandler(credential.kind)
        })?;

        let result = handler.resolve(&credential.raw_token).await;

        match &result {
            Ok(resolved) => {
                info!(
                    credential_kind = %credential.kind,
                    identity = %resolved.identity(),
                    "Credential resolved"
                );
            }
            Err(e) => {
                warn!(
                    credential_kind = %credential.kind,
                    error = %e,
                    "Credential resolution failed"
                );
            }
        }

        result
    }

    /// Resolve a credential and keep only the acting identity
    ///
    /// For a token grant this is the token's owner.
    pub async fn resolve_identity(&self, credential: &Credential) -> Result<Identity> {
        self.resolve(credential)
            .await
            .map(|resolved| resolved.identity().clone())
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating an IdentityResolver with handlers
pub struct IdentityResolverBuilder {
    resolver: IdentityResolver,
}

impl IdentityResolverBuilder {
    pub fn new() -> Self {
        Self {
            resolver: IdentityResolver::new(),
        }
    }

    /// Add a credential handler
    pub fn with_handler<H: CredentialHandler + 'static>(mut self, handler: H) -> Self {
        self.resolver.register_handler(handler);
        self
    }

    pub fn build(self) -> IdentityResolver {
        self.resolver
    }
}

impl Default for IdentityResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
