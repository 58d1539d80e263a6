//! Common types used across the authorization model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Identifier of a Project, the root of every ownership chain
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random project id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Stable user identity, the `sub` claim returned by introspection
///
/// Opaque to this system: it is only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An access right on a Project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Right {
    Read,
    Write,
}

impl Right {
    pub fn as_str(&self) -> &'static str {
        match self {
            Right::Read => "read",
            Right::Write => "write",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Right {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Right::Read),
            "write" => Ok(Right::Write),
            _ => Err(CoreError::InvalidRight(s.to_string())),
        }
    }
}

/// Kinds of resources in the ownership hierarchy
///
/// Every kind except `Project` has exactly one parent kind. Following
/// [`ResourceKind::parent`] from any kind terminates at `Project`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Dataset,
    DatasetVersion,
    ObjectGroup,
    Object,
}

impl ResourceKind {
    /// All kinds, leaves last
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Project,
        ResourceKind::Dataset,
        ResourceKind::DatasetVersion,
        ResourceKind::ObjectGroup,
        ResourceKind::Object,
    ];

    /// The kind of this kind's parent, `None` for the authorization root
    pub fn parent(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Project => None,
            ResourceKind::Dataset => Some(ResourceKind::Project),
            ResourceKind::DatasetVersion => Some(ResourceKind::Dataset),
            ResourceKind::ObjectGroup => Some(ResourceKind::Dataset),
            ResourceKind::Object => Some(ResourceKind::ObjectGroup),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Dataset => "dataset",
            ResourceKind::DatasetVersion => "dataset_version",
            ResourceKind::ObjectGroup => "object_group",
            ResourceKind::Object => "object",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(ResourceKind::Project),
            "dataset" => Ok(ResourceKind::Dataset),
            "dataset_version" | "datasetversion" | "dataset-version" => {
                Ok(ResourceKind::DatasetVersion)
            }
            "object_group" | "objectgroup" | "object-group" => Ok(ResourceKind::ObjectGroup),
            "object" => Ok(ResourceKind::Object),
            _ => Err(CoreError::UnsupportedResource(s.to_string())),
        }
    }
}

/// A typed reference to a single resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
