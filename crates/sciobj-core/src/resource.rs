//! Datasets, object groups and objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ProjectId;

/// Lifecycle status of a stored resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Initiating,
    Available,
    Unavailable,
    Deleting,
}

/// A dataset, owned by exactly one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub project_id: ProjectId,
    pub name: String,
    pub dataset_type: String,
    pub is_public: bool,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(project_id: ProjectId, name: impl Into<String>, dataset_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id,
            name: name.into(),
            dataset_type: dataset_type.into(),
            is_public: false,
            status: Status::Available,
            created_at: Utc::now(),
        }
    }
}

/// A single stored object inside an object group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// `{object_group_id}-{index}`
    pub id: String,
    pub object_group_id: String,
    pub filename: String,
    pub filetype: String,
    pub content_len: u64,
    /// Object storage key: `{project}/{dataset}/{group}/{index}/{filename}`
    pub storage_key: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

/// A group of objects uploaded together into a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGroup {
    pub id: String,
    pub dataset_id: String,
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub objects: Vec<ObjectEntry>,
    pub created_at: DateTime<Utc>,
}

impl ObjectGroup {
    /// Build a group and lay out its objects' ids and storage keys
    pub fn new(
        project_id: &ProjectId,
        dataset_id: impl Into<String>,
        name: impl Into<String>,
        labels: BTreeMap<String, String>,
        files: Vec<(String, String, u64)>,
    ) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let dataset_id = dataset_id.into();
        let now = Utc::now();

        let objects = files
            .into_iter()
            .enumerate()
            .map(|(index, (filename, filetype, content_len))| ObjectEntry {
                id: format!("{}-{}", id, index),
                object_group_id: id.clone(),
                storage_key: format!("{}/{}/{}/{}/{}", project_id, dataset_id, id, index, filename),
                filename,
                filetype,
                content_len,
                status: Status::Initiating,
                created_at: now,
            })
            .collect();

        Self {
            id,
            dataset_id,
            name: name.into(),
            labels,
            objects,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_layout() {
        let project = ProjectId::new("p1");
        let group = ObjectGroup::new(
            &project,
            "d1",
            "raw reads",
            BTreeMap::new(),
            vec![
                ("a.fastq".into(), "fastq".into(), 10),
                ("b.fastq".into(), "fastq".into(), 20),
            ],
        );

        assert_eq!(group.objects.len(), 2);
        assert_eq!(group.objects[1].id, format!("{}-1", group.id));
        assert_eq!(group.objects[1].object_group_id, group.id);
        assert_eq!(
            group.objects[0].storage_key,
            format!("p1/d1/{}/0/a.fastq", group.id)
        );
    }
}
