//! Core logic for the server

pub mod authorize;
pub mod error;
pub mod hierarchy;
pub mod revision;
pub mod tokens;

pub use authorize::AuthorizationEngine;
pub use error::{AuthError, RevisionError, TokenError};
pub use hierarchy::{HierarchyConfig, HierarchyResolver};
pub use revision::{RevisionAssigner, RevisionConfig};
pub use tokens::{TokenConfig, TokenStore};
