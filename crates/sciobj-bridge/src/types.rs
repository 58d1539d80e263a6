//! Core types for the Credential Bridge

use sciobj_core::{Identity, TokenGrant};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of credential a caller can present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Token issued by an external identity provider, resolved by introspection
    ExternalDelegated,
    /// Token issued and stored by this service
    LocalApiToken,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::ExternalDelegated => write!(f, "external_delegated"),
            CredentialKind::LocalApiToken => write!(f, "local_api_token"),
        }
    }
}

/// A credential extracted from one request
///
/// Never persisted. `Debug` does not print the raw token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub raw_token: String,
    pub kind: CredentialKind,
}

impl Credential {
    pub fn new(raw_token: impl Into<String>, kind: CredentialKind) -> Self {
        Self {
            raw_token: raw_token.into(),
            kind,
        }
    }

    pub fn delegated(raw_token: impl Into<String>) -> Self {
        Self::new(raw_token, CredentialKind::ExternalDelegated)
    }

    pub fn api_token(raw_token: impl Into<String>) -> Self {
        Self::new(raw_token, CredentialKind::LocalApiToken)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("raw_token", &"<redacted>")
            .field("kind", &self.kind)
            .finish()
    }
}

/// What a credential resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A user identity; access is decided by project membership
    Identity(Identity),
    /// A token grant; access is decided by the grant's own rights
    Grant(TokenGrant),
}

impl Resolved {
    /// The identity acting behind this credential
    pub fn identity(&self) -> &Identity {
        match self {
            Resolved::Identity(identity) => identity,
            Resolved::Grant(grant) => &grant.owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciobj_core::{ResourceKind, Right};

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::api_token("super-secret-value");
        let printed = format!("{:?}", cred);
        assert!(!printed.contains("super-secret-value"));
        assert!(printed.contains("LocalApiToken"));
    }

    #[test]
    fn test_grant_identity_is_owner() {
        let resolved = Resolved::Grant(TokenGrant::new(
            Identity::new("alice"),
            [Right::Read],
            ResourceKind::Project,
        ));
        assert_eq!(resolved.identity().as_str(), "alice");
    }
}
