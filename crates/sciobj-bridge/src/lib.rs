//! Credential Bridge
//!
//! The bridge turns request metadata into something the decision engine can
//! check: either a stable user identity or a pre-scoped token grant.
//!
//! ## Architecture
//!
//! 1. [`extract`] reads the two credential fields from request metadata and
//!    keeps exactly one [`Credential`].
//! 2. [`IdentityResolver`] routes the credential to the handler registered for
//!    its kind:
//!    - **Introspection**: delegated tokens are resolved to the `sub` claim of
//!      an external userinfo endpoint
//!    - **API token**: local tokens are resolved to their embedded grant via a
//!      token backend, without any external call
//!    - **Mock**: for testing purposes
//!
//! The bridge never looks at project membership. That decision is made by
//! the server once the owning project is known.
//!
//! ## Usage
//!
//! ```ignore
//! use sciobj_bridge::{extract, IdentityResolverBuilder, handlers::*};
//!
//! let resolver = IdentityResolverBuilder::new()
//!     .with_handler(IntrospectionHandler::new(IntrospectionConfig::new(
//!         "https://login.example.org/oauth2/userinfo",
//!     ))?)
//!     .with_handler(ApiTokenHandler::new(token_backend))
//!     .build();
//!
//! let credential = extract(&headers)?;
//! let resolved = resolver.resolve(&credential).await?;
//! ```

pub mod bridge;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod types;

pub use bridge::{CredentialHandler, IdentityResolver, IdentityResolverBuilder};
pub use error::{BridgeError, Result};
pub use extract::{extract, ACCESS_TOKEN_FIELD, API_TOKEN_FIELD};
pub use types::{Credential, CredentialKind, Resolved};
