//! Credential handlers for each credential kind

pub mod apitoken;
pub mod introspection;
pub mod mock;

pub use apitoken::{ApiTokenHandler, InMemoryTokenBackend, TokenGrantBackend};
pub use introspection::{IntrospectionConfig, IntrospectionHandler};
pub use mock::MockHandler;
