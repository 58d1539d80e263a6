//! Science Objects Server
//!
//! Authorization and dataset release service for Science Objects:
//! - Resolves callers from a delegated access token or a local API token
//! - Maps every resource to its owning project and decides access by
//!   project membership or token grant
//! - Issues API tokens
//! - Assigns unique revisions to dataset version releases
//!
//! ## Access model
//!
//! Rights are only ever granted on a Project. A request against any other
//! resource is checked against the project at the top of its ownership chain:
//!
//! ```text
//! Object -> ObjectGroup -> Dataset -> Project
//!           DatasetVersion -> Dataset -> Project
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /v1/projects` - Create a project owned by the caller
//! - `GET /v1/projects` - List the caller's projects
//! - `GET /v1/projects/{id}` - Get a project
//! - `DELETE /v1/projects/{id}` - Delete an empty project
//! - `POST /v1/projects/{id}/members` - Add or widen a member
//! - `GET /v1/projects/{id}/datasets` - List a project's datasets
//! - `POST /v1/datasets` - Create a dataset
//! - `GET /v1/datasets/{id}` - Get a dataset
//! - `GET /v1/datasets/{id}/versions` - List released versions
//! - `POST /v1/datasets/{id}/versions` - Release a version
//! - `GET /v1/dataset-versions/{id}` - Get a released version
//! - `POST /v1/object-groups` - Create an object group
//! - `GET /v1/object-groups/{id}` - Get an object group
//! - `GET /v1/objects/{id}` - Get an object
//! - `POST /v1/tokens` - Issue an API token
//! - `GET /v1/tokens` - List the caller's tokens
//! - `GET /v1/authorize` - Check a right without acting on it

pub mod api;
pub mod config;
pub mod core;
pub mod storage;

pub use api::create_router;
pub use api::state::AppState;
pub use config::{ConfigError, ServerConfig};
pub use crate::core::{AuthError, AuthorizationEngine, HierarchyResolver, RevisionAssigner, TokenStore};
pub use storage::{MemoryStore, ProjectDeletion, ProjectStore, ReleaseStore, ResourceStore, StorageError, TokenStorage};
