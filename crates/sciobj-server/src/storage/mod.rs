//! Storage abstraction for the server
//!
//! This module provides trait-based abstractions over the backing store,
//! one trait per collaborator the authorization core depends on:
//!
//! - [`ResourceStore`]: datasets, dataset versions, object groups and objects,
//!   with point lookups of each resource's parent
//! - [`ProjectStore`]: projects and their membership
//! - [`TokenStorage`]: issued API tokens
//! - [`ReleaseStore`]: released dataset versions, keyed for revision counting
//!
//! Both the in-memory (default) and PostgreSQL backends implement all four.
//! Every lookup distinguishes "not found" from a transient failure.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use sciobj_core::{
    ApiToken, Dataset, DatasetVersionEntry, Identity, ObjectEntry, ObjectGroup, Project, ProjectId,
    Right, VersionKey,
};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    pub(crate) fn poisoned<T>(err: std::sync::PoisonError<T>) -> Self {
        StorageError::Database(format!("lock poisoned: {}", err))
    }
}

/// Outcome of [`ProjectStore::delete_project_if_empty`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectDeletion {
    Deleted,
    NotFound,
    /// The project still owns datasets and was kept
    HasDatasets,
}

/// Resource storage: the hierarchy below a project
///
/// The four `*_of` lookups are the single-hop parent reads used by the
/// hierarchy resolver. They return `StorageError::NotFound` when the resource
/// does not exist.
#[async_trait]
pub trait ResourceStore: Send + Sync + Debug {
    // =========================================================================
    // Parent lookups
    // =========================================================================

    /// Project owning a dataset
    async fn project_of_dataset(&self, dataset_id: &str) -> Result<ProjectId, StorageError>;

    /// Dataset a released version belongs to
    async fn dataset_of_version(&self, version_id: &str) -> Result<String, StorageError>;

    /// Dataset an object group belongs to
    async fn dataset_of_object_group(&self, group_id: &str) -> Result<String, StorageError>;

    /// Object group an object belongs to
    async fn object_group_of_object(&self, object_id: &str) -> Result<String, StorageError>;

    // =========================================================================
    // Datasets
    // =========================================================================

    /// Persist a dataset; fails with `NotFound` if its project does not exist
    async fn insert_dataset(&self, dataset: Dataset) -> Result<(), StorageError>;

    async fn get_dataset(&self, dataset_id: &str) -> Result<Option<Dataset>, StorageError>;

    async fn list_project_datasets(&self, project_id: &ProjectId) -> Result<Vec<Dataset>, StorageError>;

    // =========================================================================
    // Object groups and objects
    // =========================================================================

    async fn insert_object_group(&self, group: ObjectGroup) -> Result<(), StorageError>;

    async fn get_object_group(&self, group_id: &str) -> Result<Option<ObjectGroup>, StorageError>;

    async fn get_object(&self, object_id: &str) -> Result<Option<ObjectEntry>, StorageError>;
}

/// Project storage: membership is the basis of delegated-token decisions
#[async_trait]
pub trait ProjectStore: Send + Sync + Debug {
    async fn insert_project(&self, project: Project) -> Result<(), StorageError>;

    async fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StorageError>;

    /// Add a member, merging rights for an existing member
    async fn add_member(
        &self,
        project_id: &ProjectId,
        identity: Identity,
        rights: BTreeSet<Right>,
    ) -> Result<Project, StorageError>;

    /// Check whether `identity` holds `right` on the project
    ///
    /// An unknown project is simply `false`.
    async fn is_member(
        &self,
        project_id: &ProjectId,
        identity: &Identity,
        right: Right,
    ) -> Result<bool, StorageError>;

    async fn list_projects_for(&self, identity: &Identity) -> Result<Vec<Project>, StorageError>;

    /// Delete a project that owns no datasets
    ///
    /// The emptiness check and the removal are atomic with respect to
    /// [`ResourceStore::insert_dataset`].
    async fn delete_project_if_empty(&self, project_id: &ProjectId)
        -> Result<ProjectDeletion, StorageError>;
}

/// Token storage: looked up by secret on every use
#[async_trait]
pub trait TokenStorage: Send + Sync + Debug {
    /// Persist a token; fails with `AlreadyExists` on a duplicate secret
    async fn insert_token(&self, token: ApiToken) -> Result<(), StorageError>;

    async fn find_by_secret(&self, secret: &str) -> Result<Option<ApiToken>, StorageError>;

    async fn list_tokens_for(&self, owner: &Identity) -> Result<Vec<ApiToken>, StorageError>;
}

/// Release storage: backs revision assignment
#[async_trait]
pub trait ReleaseStore: Send + Sync + Debug {
    /// Number of releases stored under `key`
    async fn count_by_key(&self, key: &VersionKey) -> Result<u64, StorageError>;

    /// Persist a release
    ///
    /// Must fail with `AlreadyExists` if a release with the same key and
    /// revision is already stored. This check is atomic with the insert.
    async fn insert_release(&self, entry: DatasetVersionEntry) -> Result<(), StorageError>;

    async fn get_release(&self, version_id: &str) -> Result<Option<DatasetVersionEntry>, StorageError>;

    async fn list_releases(&self, dataset_id: &str) -> Result<Vec<DatasetVersionEntry>, StorageError>;
}
