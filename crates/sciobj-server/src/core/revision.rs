//! Revision assignment for dataset version releases
//!
//! A revision distinguishes repeated releases of the same
//! `(dataset, major, minor, patch, stage)` key. It is the number of existing
//! releases under the key plus one.
//!
//! Counting and inserting are separate store calls, so two concurrent
//! releases can compute the same revision. The store rejects the second
//! insert, and the loser recounts and tries again.

use sciobj_core::{DatasetVersionEntry, Revision, VersionKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::RevisionError;
use crate::storage::{ReleaseStore, StorageError};

/// Revision assignment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionConfig {
    /// Attempts before giving up under contention
    pub max_attempts: u32,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self { max_attempts: 16 }
    }
}

/// Assigns revisions and records releases
#[derive(Debug)]
pub struct RevisionAssigner {
    store: Arc<dyn ReleaseStore>,
    config: RevisionConfig,
}

impl RevisionAssigner {
    pub fn new(store: Arc<dyn ReleaseStore>, config: RevisionConfig) -> Self {
        Self { store, config }
    }

    /// Reserve the next revision for `key`
    ///
    /// The reservation is a release with no object groups and no metadata.
    pub async fn assign_revision(&self, key: &VersionKey) -> Result<Revision, RevisionError> {
        self.reserve(key, |revision| {
            DatasetVersionEntry::new(key, revision, Vec::new(), serde_json::Value::Null)
        })
        .await
        .map(|entry| entry.version.revision)
    }

    /// Release a dataset version under the next free revision of `key`
    pub async fn release(
        &self,
        key: &VersionKey,
        object_group_ids: Vec<String>,
        metadata: serde_json::Value,
    ) -> Result<DatasetVersionEntry, RevisionError> {
        self.reserve(key, |revision| {
            DatasetVersionEntry::new(key, revision, object_group_ids.clone(), metadata.clone())
        })
        .await
    }

    async fn reserve<F>(&self, key: &VersionKey, build: F) -> Result<DatasetVersionEntry, RevisionError>
    where
        F: Fn(Revision) -> DatasetVersionEntry,
    {
        for attempt in 1..=self.config.max_attempts {
            let count = self.store.count_by_key(key).await?;
            let revision = Revision::after_count(key, count)?;
            let entry = build(revision);

            match self.store.insert_release(entry.clone()).await {
                Ok(()) => {
                    info!(
                        key = %key,
                        revision = %revision,
                        version_id = %entry.id,
                        attempt,
                        "Released dataset version"
                    );
                    return Ok(entry);
                }
                Err(StorageError::AlreadyExists(_)) => {
                    debug!(key = %key, revision = %revision, attempt, "Revision taken, recounting");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(key = %key, attempts = self.config.max_attempts, "Gave up reserving a revision");
        Err(RevisionError::Conflict {
            key: key.clone(),
            attempts: self.config.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use sciobj_core::Stage;

    fn assigner() -> RevisionAssigner {
        RevisionAssigner::new(Arc::new(MemoryStore::new()), RevisionConfig::default())
    }

    #[tokio::test]
    async fn test_first_revision_is_one() {
        let assigner = assigner();
        let key = VersionKey::new("D1", 0, 0, 1, Stage::Stable);
        assert_eq!(assigner.assign_revision(&key).await.unwrap(), Revision::FIRST);
    }

    #[tokio::test]
    async fn test_sequential_releases_count_up() {
        let assigner = assigner();
        let key = VersionKey::new("D1", 0, 0, 1, Stage::Stable);

        for expected in 1..=3u32 {
            let entry = assigner
                .release(&key, vec!["G1".into()], serde_json::json!({ "note": expected }))
                .await
                .unwrap();
            assert_eq!(entry.version.revision.get(), expected);
            assert_eq!(entry.object_count, 1);
        }
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let assigner = assigner();
        let stable = VersionKey::new("D1", 0, 0, 1, Stage::Stable);
        let next_patch = VersionKey::new("D1", 0, 0, 2, Stage::Stable);
        let beta = VersionKey::new("D1", 0, 0, 1, Stage::Beta);
        let other = VersionKey::new("D2", 0, 0, 1, Stage::Stable);

        assert_eq!(assigner.assign_revision(&stable).await.unwrap().get(), 1);
        assert_eq!(assigner.assign_revision(&stable).await.unwrap().get(), 2);

        assert_eq!(assigner.assign_revision(&next_patch).await.unwrap(), Revision::FIRST);
        assert_eq!(assigner.assign_revision(&beta).await.unwrap(), Revision::FIRST);
        assert_eq!(assigner.assign_revision(&other).await.unwrap(), Revision::FIRST);
    }

    /// Reports a stale count and rejects every insert
    #[derive(Debug)]
    struct AlwaysTaken;

    #[async_trait]
    impl ReleaseStore for AlwaysTaken {
        async fn count_by_key(&self, _: &VersionKey) -> Result<u64, StorageError> {
            Ok(0)
        }
        async fn insert_release(&self, _: DatasetVersionEntry) -> Result<(), StorageError> {
            Err(StorageError::AlreadyExists("taken".into()))
        }
        async fn get_release(&self, _: &str) -> Result<Option<DatasetVersionEntry>, StorageError> {
            Ok(None)
        }
        async fn list_releases(&self, _: &str) -> Result<Vec<DatasetVersionEntry>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let assigner = RevisionAssigner::new(Arc::new(AlwaysTaken), RevisionConfig { max_attempts: 3 });
        let key = VersionKey::new("D1", 1, 0, 0, Stage::Stable);

        match assigner.assign_revision(&key).await {
            Err(RevisionError::Conflict { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    /// Fails the count itself
    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl ReleaseStore for Unreachable {
        async fn count_by_key(&self, _: &VersionKey) -> Result<u64, StorageError> {
            Err(StorageError::Connection("refused".into()))
        }
        async fn insert_release(&self, _: DatasetVersionEntry) -> Result<(), StorageError> {
            unreachable!()
        }
        async fn get_release(&self, _: &str) -> Result<Option<DatasetVersionEntry>, StorageError> {
            Ok(None)
        }
        async fn list_releases(&self, _: &str) -> Result<Vec<DatasetVersionEntry>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let assigner = RevisionAssigner::new(Arc::new(Unreachable), RevisionConfig::default());
        let key = VersionKey::new("D1", 1, 0, 0, Stage::Stable);
        assert!(matches!(
            assigner.assign_revision(&key).await,
            Err(RevisionError::Storage(StorageError::Connection(_)))
        ));
    }
}
