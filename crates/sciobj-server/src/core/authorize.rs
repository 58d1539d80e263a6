//! Authorization decision engine
//!
//! Answers "may the caller behind this request perform `right` on this
//! resource?". A request that can be evaluated yields a [`Decision`]; one
//! that cannot (no credential, unknown resource, broken lookup) yields an
//! [`AuthError`].
//!
//! ## Evaluation
//!
//! 1. Reject kinds with no route to `Project`, before any I/O.
//! 2. Extract exactly one credential from the request metadata.
//! 3. Resolve the credential and the owning project concurrently.
//! 4. Delegated identities are checked against project membership; local
//!    token grants are checked against their own rights only. An unknown
//!    local token is denied whatever the project lookup found.

use axum::http::HeaderMap;
use sciobj_bridge::{extract, BridgeError, CredentialKind, IdentityResolver, Resolved};
use sciobj_core::{Decision, Identity, ProjectId, ResourceKind, Right};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::hierarchy::HierarchyResolver;
use crate::storage::ProjectStore;

/// Decides authorization requests
pub struct AuthorizationEngine {
    resolver: Arc<IdentityResolver>,
    hierarchy: Arc<HierarchyResolver>,
    projects: Arc<dyn ProjectStore>,
    membership_timeout: Duration,
}

impl AuthorizationEngine {
    pub fn new(
        resolver: Arc<IdentityResolver>,
        hierarchy: Arc<HierarchyResolver>,
        projects: Arc<dyn ProjectStore>,
        membership_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            hierarchy,
            projects,
            membership_timeout,
        }
    }

    /// Authorize a request against a resource named by a string kind
    ///
    /// Unrecognized kinds fail with `UnsupportedResource` before anything
    /// else is looked at.
    pub async fn authorize_named(
        &self,
        metadata: &HeaderMap,
        kind: &str,
        id: &str,
        right: Right,
    ) -> Result<Decision, AuthError> {
        let kind: ResourceKind = kind.parse()?;
        self.authorize(metadata, kind, id, right).await
    }

    /// Authorize a request to perform `right` on `(kind, id)`
    pub async fn authorize(
        &self,
        metadata: &HeaderMap,
        kind: ResourceKind,
        id: &str,
        right: Right,
    ) -> Result<Decision, AuthError> {
        self.hierarchy.route(kind)?;

        let credential = extract(metadata)?;

        let (resolved, project) = tokio::join!(
            self.resolver.resolve(&credential),
            self.hierarchy.resolve_owning_project(kind, id),
        );

        // Authentication failures take precedence over the project lookup, so
        // a caller without a valid credential cannot tell which resources exist.
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(BridgeError::UnknownToken) if credential.kind == CredentialKind::LocalApiToken => {
                return Ok(self.record(kind, id, right, None, Decision::Denied));
            }
            Err(BridgeError::TokenLookupFailed(cause))
                if credential.kind == CredentialKind::LocalApiToken =>
            {
                return Ok(self.record(kind, id, right, None, Decision::Failed(cause)));
            }
            Err(e) => return Err(e.into()),
        };

        let project = project?;

        let decision = match resolved {
            Resolved::Grant(grant) => {
                // Grants are checked at project scope by rights alone
                Decision::from_bool(grant.has_right(right))
            }
            Resolved::Identity(identity) => self.check_membership(&project, &identity, right).await,
        };

        Ok(self.record(kind, id, right, Some(&project), decision))
    }

    /// Resolve the identity behind a request without authorizing anything
    ///
    /// For a local token this is the token's owner.
    pub async fn identify(&self, metadata: &HeaderMap) -> Result<Identity, AuthError> {
        self.identify_with_kind(metadata)
            .await
            .map(|(identity, _)| identity)
    }

    /// Like [`identify`](Self::identify), also reporting the credential kind used
    pub async fn identify_with_kind(
        &self,
        metadata: &HeaderMap,
    ) -> Result<(Identity, CredentialKind), AuthError> {
        let credential = extract(metadata)?;
        let identity = self.resolver.resolve_identity(&credential).await?;
        Ok((identity, credential.kind))
    }

    async fn check_membership(&self, project: &ProjectId, identity: &Identity, right: Right) -> Decision {
        let lookup = self.projects.is_member(project, identity, right);

        match tokio::time::timeout(self.membership_timeout, lookup).await {
            Ok(Ok(is_member)) => Decision::from_bool(is_member),
            Ok(Err(e)) => Decision::Failed(format!("membership lookup failed: {}", e)),
            Err(_) => Decision::Failed("membership lookup timed out".into()),
        }
    }

    fn record(
        &self,
        kind: ResourceKind,
        id: &str,
        right: Right,
        project: Option<&ProjectId>,
        decision: Decision,
    ) -> Decision {
        let project_id = project.map(ProjectId::as_str);
        match &decision {
            Decision::Allowed => {
                debug!(kind = %kind, id = %id, right = %right, project_id, "Access allowed");
            }
            Decision::Denied => {
                info!(kind = %kind, id = %id, right = %right, project_id, "Access denied");
            }
            Decision::Failed(cause) => {
                warn!(
                    kind = %kind,
                    id = %id,
                    right = %right,
                    project_id,
                    cause = %cause,
                    "Authorization check failed"
                );
            }
        }
        decision
    }
}
