//! # Science Objects Core
//!
//! Domain types shared by the credential bridge and the server:
//!
//! - **Projects**: the tenant-level resource and the only place rights are granted
//! - **Resource hierarchy**: Object → ObjectGroup → Dataset → Project, with
//!   DatasetVersion hanging off Dataset
//! - **API tokens**: locally issued secrets carrying an embedded rights grant
//! - **Dataset versions**: semantic versions plus a per-key revision counter
//! - **Decisions**: the three-valued outcome of an authorization check
//!
//! ## Ownership
//!
//! A Project owns its membership list. Every other resource references its
//! parent by id and never changes parent after creation, which is what makes
//! caching the ownership chain safe.

pub mod decision;
pub mod error;
pub mod project;
pub mod resource;
pub mod token;
pub mod types;
pub mod version;

pub use decision::Decision;
pub use error::{CoreError, Result};
pub use project::{Project, ProjectMember};
pub use resource::{Dataset, ObjectEntry, ObjectGroup, Status};
pub use token::{ApiToken, TokenGrant, TokenSummary};
pub use types::{Identity, ProjectId, ResourceKind, ResourceRef, Right};
pub use version::{DatasetVersionEntry, Revision, Stage, Version, VersionKey};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
