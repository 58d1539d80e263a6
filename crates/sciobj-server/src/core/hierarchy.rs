//! Resource hierarchy resolution
//!
//! Maps any resource to the project that ultimately owns it by following
//! single-hop parent lookups:
//!
//! ```text
//! Object -> ObjectGroup -> Dataset -> Project
//!           DatasetVersion -> Dataset -> Project
//! ```
//!
//! Each kind's hop is one entry in a lookup table. Supporting a new kind
//! means adding an entry, not another branch in the walk.

use moka::future::Cache;
use sciobj_core::{ProjectId, ResourceKind, ResourceRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::AuthError;
use crate::storage::{ResourceStore, StorageError};

/// Future returned by a parent lookup
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<String, StorageError>> + Send + 'a>>;

/// Reads the id of a resource's parent
pub type ParentLookup = for<'a> fn(&'a dyn ResourceStore, &'a str) -> LookupFuture<'a>;

/// One step up the ownership chain
#[derive(Clone, Copy)]
pub struct Hop {
    pub kind: ResourceKind,
    pub parent: ResourceKind,
    lookup: ParentLookup,
}

impl Hop {
    pub fn new(kind: ResourceKind, parent: ResourceKind, lookup: ParentLookup) -> Self {
        Self { kind, parent, lookup }
    }
}

impl std::fmt::Debug for Hop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.kind, self.parent)
    }
}

fn dataset_parent<'a>(store: &'a dyn ResourceStore, id: &'a str) -> LookupFuture<'a> {
    Box::pin(async move { store.project_of_dataset(id).await.map(|p| p.0) })
}

fn dataset_version_parent<'a>(store: &'a dyn ResourceStore, id: &'a str) -> LookupFuture<'a> {
    Box::pin(async move { store.dataset_of_version(id).await })
}

fn object_group_parent<'a>(store: &'a dyn ResourceStore, id: &'a str) -> LookupFuture<'a> {
    Box::pin(async move { store.dataset_of_object_group(id).await })
}

fn object_parent<'a>(store: &'a dyn ResourceStore, id: &'a str) -> LookupFuture<'a> {
    Box::pin(async move { store.object_group_of_object(id).await })
}

/// The default hop table covering every non-project kind
///
/// Each hop's parent kind comes from [`ResourceKind::parent`].
pub fn default_hops() -> Vec<Hop> {
    let lookups: [(ResourceKind, ParentLookup); 4] = [
        (ResourceKind::Dataset, dataset_parent),
        (ResourceKind::DatasetVersion, dataset_version_parent),
        (ResourceKind::ObjectGroup, object_group_parent),
        (ResourceKind::Object, object_parent),
    ];

    lookups
        .into_iter()
        .filter_map(|(kind, lookup)| kind.parent().map(|parent| Hop::new(kind, parent, lookup)))
        .collect()
}

/// Hierarchy resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Upper bound on a single parent lookup
    pub lookup_timeout: Duration,

    /// How long a resolved owner stays cached; `None` disables the cache
    pub cache_ttl: Option<Duration>,

    /// Maximum number of cached owners
    pub cache_capacity: u64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_millis(5000),
            cache_ttl: Some(Duration::from_secs(300)),
            cache_capacity: 10_000,
        }
    }
}

/// Resolves the owning project of any resource
pub struct HierarchyResolver {
    store: Arc<dyn ResourceStore>,
    hops: HashMap<ResourceKind, Hop>,
    config: HierarchyConfig,
    /// Resource -> owning project. Parents never change, so entries only expire.
    owners: Option<Cache<ResourceRef, ProjectId>>,
}

impl HierarchyResolver {
    pub fn new(store: Arc<dyn ResourceStore>, config: HierarchyConfig) -> Self {
        Self::with_hops(store, config, default_hops())
    }

    /// Build a resolver over a custom hop table
    pub fn with_hops(store: Arc<dyn ResourceStore>, config: HierarchyConfig, hops: Vec<Hop>) -> Self {
        let owners = config.cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(ttl)
                .build()
        });

        Self {
            store,
            hops: hops.into_iter().map(|h| (h.kind, h)).collect(),
            config,
            owners,
        }
    }

    /// The hops from `kind` up to `Project`
    ///
    /// Validates the whole route without touching storage, so an unsupported
    /// kind fails before any lookup is issued.
    pub fn route(&self, kind: ResourceKind) -> Result<Vec<Hop>, AuthError> {
        let mut route = Vec::new();
        let mut current = kind;

        while current != ResourceKind::Project {
            // A route can never be longer than the table; anything else is a cycle
            if route.len() > self.hops.len() {
                return Err(AuthError::UnsupportedResource(kind.to_string()));
            }

            let hop = self
                .hops
                .get(&current)
                .ok_or_else(|| AuthError::UnsupportedResource(current.to_string()))?;
            route.push(*hop);
            current = hop.parent;
        }

        Ok(route)
    }

    /// Resolve the owning project of `(kind, id)`
    ///
    /// Fails with `ResourceNotFound` naming the hop that found nothing, or
    /// `InternalLookupFailure` if a lookup errored or timed out.
    pub async fn resolve_owning_project(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<ProjectId, AuthError> {
        let route = self.route(kind)?;

        if route.is_empty() {
            return Ok(ProjectId::new(id));
        }

        let target = ResourceRef::new(kind, id);
        if let Some(owners) = &self.owners {
            if let Some(project) = owners.get(&target).await {
                debug!(resource = %target, project_id = %project, "Owner cache hit");
                return Ok(project);
            }
        }

        let mut current_id = id.to_string();
        for hop in &route {
            current_id = self.lookup_parent(hop, &current_id).await?;
        }

        let project = ProjectId::new(current_id);
        debug!(resource = %target, project_id = %project, hops = route.len(), "Resolved owning project");

        if let Some(owners) = &self.owners {
            owners.insert(target, project.clone()).await;
        }

        Ok(project)
    }

    async fn lookup_parent(&self, hop: &Hop, id: &str) -> Result<String, AuthError> {
        let lookup = (hop.lookup)(self.store.as_ref(), id);

        match tokio::time::timeout(self.config.lookup_timeout, lookup).await {
            Ok(Ok(parent)) => Ok(parent),
            Ok(Err(e)) if e.is_not_found() => Err(AuthError::ResourceNotFound {
                kind: hop.kind,
                id: id.to_string(),
            }),
            Ok(Err(e)) => {
                warn!(kind = %hop.kind, id = %id, error = %e, "Parent lookup failed");
                Err(AuthError::InternalLookupFailure(format!(
                    "looking up parent of {} {}: {}",
                    hop.kind, id, e
                )))
            }
            Err(_) => {
                warn!(
                    kind = %hop.kind,
                    id = %id,
                    timeout_ms = self.config.lookup_timeout.as_millis() as u64,
                    "Parent lookup timed out"
                );
                Err(AuthError::InternalLookupFailure(format!(
                    "looking up parent of {} {}: timed out",
                    hop.kind, id
                )))
            }
        }
    }
}
