//! In-memory storage backend
//!
//! Default storage implementation using in-memory hashmaps.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use sciobj_core::{
    ApiToken, Dataset, DatasetVersionEntry, Identity, ObjectEntry, ObjectGroup, Project, ProjectId,
    Right, VersionKey,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use tracing::info;

use super::{ProjectDeletion, ProjectStore, ReleaseStore, ResourceStore, StorageError, TokenStorage};

/// In-memory store implementing every storage trait
#[derive(Debug)]
pub struct MemoryStore {
    projects: RwLock<HashMap<ProjectId, Project>>,
    datasets: RwLock<HashMap<String, Dataset>>,
    object_groups: RwLock<HashMap<String, ObjectGroup>>,
    /// object id -> object group id
    objects: RwLock<HashMap<String, String>>,
    releases: RwLock<HashMap<String, DatasetVersionEntry>>,
    /// secret -> token
    tokens: RwLock<HashMap<String, ApiToken>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(HashMap::new()),
            datasets: RwLock::new(HashMap::new()),
            object_groups: RwLock::new(HashMap::new()),
            objects: RwLock::new(HashMap::new()),
            releases: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    // =========================================================================
    // Parent lookups
    // =========================================================================

    async fn project_of_dataset(&self, dataset_id: &str) -> Result<ProjectId, StorageError> {
        let datasets = self.datasets.read().map_err(StorageError::poisoned)?;
        datasets
            .get(dataset_id)
            .map(|d| d.project_id.clone())
            .ok_or_else(|| StorageError::NotFound(format!("dataset {}", dataset_id)))
    }

    async fn dataset_of_version(&self, version_id: &str) -> Result<String, StorageError> {
        let releases = self.releases.read().map_err(StorageError::poisoned)?;
        releases
            .get(version_id)
            .map(|r| r.dataset_id.clone())
            .ok_or_else(|| StorageError::NotFound(format!("dataset version {}", version_id)))
    }

    async fn dataset_of_object_group(&self, group_id: &str) -> Result<String, StorageError> {
        let groups = self.object_groups.read().map_err(StorageError::poisoned)?;
        groups
            .get(group_id)
            .map(|g| g.dataset_id.clone())
            .ok_or_else(|| StorageError::NotFound(format!("object group {}", group_id)))
    }

    async fn object_group_of_object(&self, object_id: &str) -> Result<String, StorageError> {
        let objects = self.objects.read().map_err(StorageError::poisoned)?;
        objects
            .get(object_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("object {}", object_id)))
    }

    // =========================================================================
    // Datasets
    // =========================================================================

    async fn insert_dataset(&self, dataset: Dataset) -> Result<(), StorageError> {
        // Lock order: projects, then datasets
        let projects = self.projects.read().map_err(StorageError::poisoned)?;
        if !projects.contains_key(&dataset.project_id) {
            return Err(StorageError::NotFound(format!("project {}", dataset.project_id)));
        }

        let mut datasets = self.datasets.write().map_err(StorageError::poisoned)?;
        if datasets.contains_key(&dataset.id) {
            return Err(StorageError::AlreadyExists(format!("dataset {}", dataset.id)));
        }
        info!(dataset_id = %dataset.id, project_id = %dataset.project_id, "Storing dataset");
        datasets.insert(dataset.id.clone(), dataset);
        Ok(())
    }

    async fn get_dataset(&self, dataset_id: &str) -> Result<Option<Dataset>, StorageError> {
        let datasets = self.datasets.read().map_err(StorageError::poisoned)?;
        Ok(datasets.get(dataset_id).cloned())
    }

    async fn list_project_datasets(&self, project_id: &ProjectId) -> Result<Vec<Dataset>, StorageError> {
        let datasets = self.datasets.read().map_err(StorageError::poisoned)?;
        let mut found: Vec<Dataset> = datasets
            .values()
            .filter(|d| &d.project_id == project_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    // =========================================================================
    // Object groups and objects
    // =========================================================================

    async fn insert_object_group(&self, group: ObjectGroup) -> Result<(), StorageError> {
        let mut groups = self.object_groups.write().map_err(StorageError::poisoned)?;
        if groups.contains_key(&group.id) {
            return Err(StorageError::AlreadyExists(format!("object group {}", group.id)));
        }

        let mut objects = self.objects.write().map_err(StorageError::poisoned)?;
        for object in &group.objects {
            objects.insert(object.id.clone(), group.id.clone());
        }

        info!(
            group_id = %group.id,
            dataset_id = %group.dataset_id,
            objects = group.objects.len(),
            "Storing object group"
        );
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_object_group(&self, group_id: &str) -> Result<Option<ObjectGroup>, StorageError> {
        let groups = self.object_groups.read().map_err(StorageError::poisoned)?;
        Ok(groups.get(group_id).cloned())
    }

    async fn get_object(&self, object_id: &str) -> Result<Option<ObjectEntry>, StorageError> {
        let group_id = {
            let objects = self.objects.read().map_err(StorageError::poisoned)?;
            match objects.get(object_id) {
                Some(id) => id.clone(),
                None => return Ok(None),
            }
        };

        let groups = self.object_groups.read().map_err(StorageError::poisoned)?;
        Ok(groups
            .get(&group_id)
            .and_then(|g| g.objects.iter().find(|o| o.id == object_id))
            .cloned())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert_project(&self, project: Project) -> Result<(), StorageError> {
        let mut projects = self.projects.write().map_err(StorageError::poisoned)?;
        if projects.contains_key(&project.id) {
            return Err(StorageError::AlreadyExists(format!("project {}", project.id)));
        }
        info!(project_id = %project.id, name = %project.name, "Storing project");
        projects.insert(project.id.clone(), project);
        Ok(())
    }

    async fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StorageError> {
        let projects = self.projects.read().map_err(StorageError::poisoned)?;
        Ok(projects.get(project_id).cloned())
    }

    async fn add_member(
        &self,
        project_id: &ProjectId,
        identity: Identity,
        rights: BTreeSet<Right>,
    ) -> Result<Project, StorageError> {
        let mut projects = self.projects.write().map_err(StorageError::poisoned)?;
        let project = projects
            .get_mut(project_id)
            .ok_or_else(|| StorageError::NotFound(format!("project {}", project_id)))?;

        info!(project_id = %project_id, identity = %identity, "Adding project member");
        project.add_member(identity, rights);
        Ok(project.clone())
    }

    async fn is_member(
        &self,
        project_id: &ProjectId,
        identity: &Identity,
        right: Right,
    ) -> Result<bool, StorageError> {
        let projects = self.projects.read().map_err(StorageError::poisoned)?;
        Ok(projects
            .get(project_id)
            .map(|p| p.grants(identity, right))
            .unwrap_or(false))
    }

    async fn list_projects_for(&self, identity: &Identity) -> Result<Vec<Project>, StorageError> {
        let projects = self.projects.read().map_err(StorageError::poisoned)?;
        let mut found: Vec<Project> = projects
            .values()
            .filter(|p| p.member(identity).is_some())
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn delete_project_if_empty(
        &self,
        project_id: &ProjectId,
    ) -> Result<ProjectDeletion, StorageError> {
        let mut projects = self.projects.write().map_err(StorageError::poisoned)?;
        if !projects.contains_key(project_id) {
            return Ok(ProjectDeletion::NotFound);
        }

        // Held until the project is gone, so no dataset can be added meanwhile
        let datasets = self.datasets.read().map_err(StorageError::poisoned)?;
        if datasets.values().any(|d| &d.project_id == project_id) {
            return Ok(ProjectDeletion::HasDatasets);
        }

        projects.remove(project_id);
        info!(project_id = %project_id, "Deleted project");
        Ok(ProjectDeletion::Deleted)
    }
}

#[async_trait]
impl TokenStorage for MemoryStore {
    async fn insert_token(&self, token: ApiToken) -> Result<(), StorageError> {
        let mut tokens = self.tokens.write().map_err(StorageError::poisoned)?;
        if tokens.contains_key(&token.secret) {
            return Err(StorageError::AlreadyExists(format!("token {}", token.id)));
        }
        info!(token_id = %token.id, owner = %token.grant.owner, "Storing API token");
        tokens.insert(token.secret.clone(), token);
        Ok(())
    }

    async fn find_by_secret(&self, secret: &str) -> Result<Option<ApiToken>, StorageError> {
        let tokens = self.tokens.read().map_err(StorageError::poisoned)?;
        Ok(tokens.get(secret).cloned())
    }

    async fn list_tokens_for(&self, owner: &Identity) -> Result<Vec<ApiToken>, StorageError> {
        let tokens = self.tokens.read().map_err(StorageError::poisoned)?;
        let mut found: Vec<ApiToken> = tokens
            .values()
            .filter(|t| &t.grant.owner == owner)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }
}

#[async_trait]
impl ReleaseStore for MemoryStore {
    async fn count_by_key(&self, key: &VersionKey) -> Result<u64, StorageError> {
        let releases = self.releases.read().map_err(StorageError::poisoned)?;
        Ok(releases.values().filter(|r| &r.key() == key).count() as u64)
    }

    async fn insert_release(&self, entry: DatasetVersionEntry) -> Result<(), StorageError> {
        // Check and insert under one write lock so concurrent releases of the
        // same key cannot both claim a revision.
        let mut releases = self.releases.write().map_err(StorageError::poisoned)?;
        let key = entry.key();
        let taken = releases
            .values()
            .any(|r| r.version.revision == entry.version.revision && r.key() == key);
        if taken {
            return Err(StorageError::AlreadyExists(format!(
                "{} revision {}",
                key, entry.version.revision
            )));
        }
        if releases.contains_key(&entry.id) {
            return Err(StorageError::AlreadyExists(format!("dataset version {}", entry.id)));
        }

        info!(
            version_id = %entry.id,
            key = %key,
            revision = %entry.version.revision,
            "Storing dataset version"
        );
        releases.insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn get_release(&self, version_id: &str) -> Result<Option<DatasetVersionEntry>, StorageError> {
        let releases = self.releases.read().map_err(StorageError::poisoned)?;
        Ok(releases.get(version_id).cloned())
    }

    async fn list_releases(&self, dataset_id: &str) -> Result<Vec<DatasetVersionEntry>, StorageError> {
        let releases = self.releases.read().map_err(StorageError::poisoned)?;
        let mut found: Vec<DatasetVersionEntry> = releases
            .values()
            .filter(|r| r.dataset_id == dataset_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }
}
