//! Application state shared across handlers

use axum::http::HeaderMap;
use sciobj_bridge::handlers::{ApiTokenHandler, IntrospectionHandler};
use sciobj_bridge::{BridgeError, CredentialHandler, IdentityResolverBuilder};
use sciobj_core::{Decision, ResourceKind, Right};
use std::sync::Arc;
use tracing::error;

use crate::api::error::ApiError;
use crate::config::ServerConfig;
use crate::core::{
    AuthorizationEngine, HierarchyConfig, HierarchyResolver, RevisionAssigner, RevisionConfig,
    TokenConfig, TokenStore,
};
use crate::storage::{ProjectStore, ReleaseStore, ResourceStore, TokenStorage};

/// Application state shared across handlers
pub struct AppState {
    pub engine: AuthorizationEngine,
    pub tokens: Arc<TokenStore>,
    pub revisions: RevisionAssigner,
    pub projects: Arc<dyn ProjectStore>,
    pub resources: Arc<dyn ResourceStore>,
    pub releases: Arc<dyn ReleaseStore>,
}

impl AppState {
    /// Build the state from configuration, resolving delegated tokens via
    /// the configured userinfo endpoint
    pub fn from_config<S>(config: &ServerConfig, store: Arc<S>) -> Result<Self, BridgeError>
    where
        S: ResourceStore + ProjectStore + TokenStorage + ReleaseStore + 'static,
    {
        let introspection = IntrospectionHandler::new(config.introspection.clone())?;

        Ok(Self::assemble(
            store,
            introspection,
            config.tokens.clone(),
            config.hierarchy.clone(),
            config.revisions.clone(),
        ))
    }

    /// Wire every component over one store
    ///
    /// `delegated` resolves external access tokens; local API tokens are
    /// always resolved against the store itself.
    pub fn assemble<S, H>(
        store: Arc<S>,
        delegated: H,
        tokens: TokenConfig,
        hierarchy: HierarchyConfig,
        revisions: RevisionConfig,
    ) -> Self
    where
        S: ResourceStore + ProjectStore + TokenStorage + ReleaseStore + 'static,
        H: CredentialHandler + 'static,
    {
        let membership_timeout = hierarchy.lookup_timeout;
        let tokens = Arc::new(TokenStore::new(store.clone(), tokens));

        let resolver = IdentityResolverBuilder::new()
            .with_handler(delegated)
            .with_handler(ApiTokenHandler::new(tokens.clone()))
            .build();

        let hierarchy = HierarchyResolver::new(store.clone(), hierarchy);
        let engine = AuthorizationEngine::new(
            Arc::new(resolver),
            Arc::new(hierarchy),
            store.clone(),
            membership_timeout,
        );

        Self {
            engine,
            tokens,
            revisions: RevisionAssigner::new(store.clone(), revisions),
            projects: store.clone(),
            resources: store.clone(),
            releases: store,
        }
    }

    /// Authorize a request, turning anything but `Allowed` into an error
    ///
    /// Denied and failed checks produce the same response.
    pub async fn require(
        &self,
        headers: &HeaderMap,
        kind: ResourceKind,
        id: &str,
        right: Right,
    ) -> Result<(), ApiError> {
        match self.engine.authorize(headers, kind, id, right).await? {
            Decision::Allowed => Ok(()),
            Decision::Denied => Err(ApiError::Forbidden),
            Decision::Failed(cause) => {
                error!(kind = %kind, id = %id, cause = %cause, "Authorization could not be evaluated");
                Err(ApiError::Forbidden)
            }
        }
    }
}
