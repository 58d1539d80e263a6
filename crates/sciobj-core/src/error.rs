//! Error types for the core domain model

use thiserror::Error;

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while parsing or constructing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Resource kind is not part of the hierarchy
    #[error("Unsupported resource kind: {0}")]
    UnsupportedResource(String),

    /// Right is neither read nor write
    #[error("Invalid right: {0}")]
    InvalidRight(String),

    /// Version stage is not recognized
    #[error("Invalid version stage: {0}")]
    InvalidStage(String),

    /// Revision counter would leave the u32 range
    #[error("Revision overflow for key {0}")]
    RevisionOverflow(String),

    /// Token construction parameters are unusable
    #[error("Invalid token parameters: {0}")]
    InvalidToken(String),
}
