//! Dataset versions and release revisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::resource::Status;

/// Release stage of a semantic version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Alpha,
    Beta,
    ReleaseCandidate,
    Stable,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Alpha => "alpha",
            Stage::Beta => "beta",
            Stage::ReleaseCandidate => "release_candidate",
            Stage::Stable => "stable",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alpha" => Ok(Stage::Alpha),
            "beta" => Ok(Stage::Beta),
            "release_candidate" | "rc" => Ok(Stage::ReleaseCandidate),
            "stable" => Ok(Stage::Stable),
            _ => Err(CoreError::InvalidStage(s.to_string())),
        }
    }
}

/// The key under which revisions are counted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub dataset_id: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub stage: Stage,
}

impl VersionKey {
    pub fn new(dataset_id: impl Into<String>, major: u32, minor: u32, patch: u32, stage: Stage) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            major,
            minor,
            patch,
            stage,
        }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}.{}.{}-{}",
            self.dataset_id, self.major, self.minor, self.patch, self.stage
        )
    }
}

/// A strictly positive release counter, unique within a [`VersionKey`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(u32);

impl Revision {
    pub const FIRST: Revision = Revision(1);

    /// The revision that follows `count` existing releases
    pub fn after_count(key: &VersionKey, count: u64) -> Result<Self> {
        count
            .checked_add(1)
            .and_then(|next| u32::try_from(next).ok())
            .map(Revision)
            .ok_or_else(|| CoreError::RevisionOverflow(key.to_string()))
    }

    /// Wrap a stored value; zero is not a revision
    pub fn from_stored(value: u32) -> Option<Self> {
        (value > 0).then_some(Revision(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully assigned version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub stage: Stage,
    pub revision: Revision,
}

impl Version {
    pub fn key(&self, dataset_id: &str) -> VersionKey {
        VersionKey::new(dataset_id, self.major, self.minor, self.patch, self.stage)
    }
}

/// A released dataset version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetVersionEntry {
    pub id: String,
    pub dataset_id: String,
    pub version: Version,
    pub object_group_ids: Vec<String>,
    pub object_count: u64,
    pub status: Status,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl DatasetVersionEntry {
    /// Build the entry for `key` released at `revision`
    pub fn new(
        key: &VersionKey,
        revision: Revision,
        object_group_ids: Vec<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            dataset_id: key.dataset_id.clone(),
            version: Version {
                major: key.major,
                minor: key.minor,
                patch: key.patch,
                stage: key.stage,
                revision,
            },
            object_count: object_group_ids.len() as u64,
            object_group_ids,
            status: Status::Initiating,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> VersionKey {
        self.version.key(&self.dataset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_after_count() {
        let key = VersionKey::new("D1", 0, 0, 1, Stage::Stable);
        assert_eq!(Revision::after_count(&key, 0).unwrap(), Revision::FIRST);
        assert_eq!(Revision::after_count(&key, 2).unwrap().get(), 3);
        assert!(matches!(
            Revision::after_count(&key, u32::MAX as u64),
            Err(CoreError::RevisionOverflow(_))
        ));
    }

    #[test]
    fn test_zero_is_not_a_revision() {
        assert!(Revision::from_stored(0).is_none());
        assert_eq!(Revision::from_stored(4).unwrap().get(), 4);
    }

    #[test]
    fn test_entry_round_trips_key() {
        let key = VersionKey::new("D1", 1, 2, 3, Stage::Beta);
        let entry = DatasetVersionEntry::new(
            &key,
            Revision::FIRST,
            vec!["og-1".into(), "og-2".into()],
            serde_json::Value::Null,
        );

        assert_eq!(entry.key(), key);
        assert_eq!(entry.object_count, 2);
        assert_eq!(entry.status, Status::Initiating);
    }

    #[test]
    fn test_key_display() {
        let key = VersionKey::new("D1", 0, 0, 1, Stage::Stable);
        assert_eq!(key.to_string(), "D1@0.0.1-stable");
    }
}
