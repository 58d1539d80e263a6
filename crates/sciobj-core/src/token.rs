//! Locally issued API tokens
//!
//! A token carries its own grant: an owner, a set of rights and a recorded
//! scope kind. The secret is drawn from the operating system CSPRNG and is
//! only ever returned in plaintext from [`ApiToken::issue`].

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CoreError, Result};
use crate::types::{Identity, ResourceKind, Right};

/// Number of random bytes in a token secret
pub const DEFAULT_SECRET_BYTES: usize = 64;

/// Lifetime of a freshly issued token
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 365;

/// The rights embedded in a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Identity the token was issued to
    pub owner: Identity,
    pub rights: BTreeSet<Right>,
    /// Recorded scope kind. Checks are always made at Project scope.
    pub scope: ResourceKind,
}

impl TokenGrant {
    pub fn new(owner: Identity, rights: impl IntoIterator<Item = Right>, scope: ResourceKind) -> Self {
        Self {
            owner,
            rights: rights.into_iter().collect(),
            scope,
        }
    }

    pub fn has_right(&self, right: Right) -> bool {
        self.rights.contains(&right)
    }
}

/// A stored API token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: String,
    pub secret: String,
    pub grant: TokenGrant,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ApiToken {
    /// Issue a new token with a random secret of `secret_bytes` bytes
    pub fn issue(grant: TokenGrant, secret_bytes: usize, ttl: Duration) -> Result<Self> {
        if secret_bytes == 0 {
            return Err(CoreError::InvalidToken("secret length must be positive".into()));
        }
        if ttl <= Duration::zero() {
            return Err(CoreError::InvalidToken("lifetime must be positive".into()));
        }

        let created_at = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            secret: generate_secret(secret_bytes),
            grant,
            created_at,
            expires_at: created_at + ttl,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// View of the token without its secret
    pub fn summary(&self) -> TokenSummary {
        TokenSummary {
            id: self.id.clone(),
            owner: self.grant.owner.clone(),
            rights: self.grant.rights.clone(),
            scope: self.grant.scope,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Token metadata safe to list back to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSummary {
    pub id: String,
    pub owner: Identity,
    pub rights: BTreeSet<Right>,
    pub scope: ResourceKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Generate a base64 (unpadded) secret from `len` bytes of OS randomness
pub fn generate_secret(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    STANDARD_NO_PAD.encode(bytes)
}
