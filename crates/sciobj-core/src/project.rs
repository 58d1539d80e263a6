//! Projects and their membership lists

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{Identity, ProjectId, Right};

/// A member of a project together with the rights granted to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub identity: Identity,
    pub rights: BTreeSet<Right>,
}

impl ProjectMember {
    pub fn new(identity: Identity, rights: impl IntoIterator<Item = Right>) -> Self {
        Self {
            identity,
            rights: rights.into_iter().collect(),
        }
    }

    pub fn has_right(&self, right: Right) -> bool {
        self.rights.contains(&right)
    }
}

/// Tenant-level resource; the only place access rights are granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub members: Vec<ProjectMember>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a project whose creator holds read and write
    pub fn new(creator: Identity, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: ProjectId::generate(),
            name: name.into(),
            description: description.into(),
            members: vec![ProjectMember::new(creator, [Right::Read, Right::Write])],
            created_at: Utc::now(),
        }
    }

    /// Look up a member by identity
    pub fn member(&self, identity: &Identity) -> Option<&ProjectMember> {
        self.members.iter().find(|m| &m.identity == identity)
    }

    /// Check whether `identity` is a member holding `right`
    pub fn grants(&self, identity: &Identity, right: Right) -> bool {
        self.member(identity).is_some_and(|m| m.has_right(right))
    }

    /// Add a member, merging rights into an existing entry for the same identity
    pub fn add_member(&mut self, identity: Identity, rights: impl IntoIterator<Item = Right>) {
        match self.members.iter_mut().find(|m| m.identity == identity) {
            Some(existing) => existing.rights.extend(rights),
            None => self.members.push(ProjectMember::new(identity, rights)),
        }
    }
}
