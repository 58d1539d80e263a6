//! API token issuance and validation

use async_trait::async_trait;
use chrono::Utc;
use sciobj_bridge::handlers::TokenGrantBackend;
use sciobj_bridge::BridgeError;
use sciobj_core::token::{DEFAULT_SECRET_BYTES, DEFAULT_TOKEN_TTL_DAYS};
use sciobj_core::{ApiToken, Identity, ResourceKind, Right, TokenGrant, TokenSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::TokenError;
use crate::storage::{StorageError, TokenStorage};

/// Token issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Random bytes per secret before encoding
    pub secret_bytes: usize,

    /// Lifetime of an issued token, in days
    pub ttl_days: i64,

    /// Reject expired tokens on lookup. Off by default.
    pub enforce_expiry: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_bytes: DEFAULT_SECRET_BYTES,
            ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            enforce_expiry: false,
        }
    }
}

/// Issues and looks up API tokens
#[derive(Debug)]
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
    config: TokenConfig,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>, config: TokenConfig) -> Self {
        Self { storage, config }
    }

    /// Issue a new token for `owner`
    ///
    /// The returned token is the only place the secret is ever handed out.
    pub async fn issue(
        &self,
        owner: Identity,
        rights: BTreeSet<Right>,
        scope: ResourceKind,
    ) -> Result<ApiToken, TokenError> {
        let grant = TokenGrant::new(owner, rights, scope);
        let token = ApiToken::issue(
            grant,
            self.config.secret_bytes,
            chrono::Duration::days(self.config.ttl_days),
        )?;

        self.storage.insert_token(token.clone()).await?;

        info!(
            token_id = %token.id,
            owner = %token.grant.owner,
            rights = ?token.grant.rights,
            expires_at = %token.expires_at,
            "Issued API token"
        );

        Ok(token)
    }

    /// Find the token for `secret`, if it is usable
    ///
    /// Expired tokens only count as unusable when expiry is enforced.
    pub async fn find_usable(&self, secret: &str) -> Result<Option<ApiToken>, StorageError> {
        let Some(token) = self.storage.find_by_secret(secret).await? else {
            return Ok(None);
        };

        if self.config.enforce_expiry && token.is_expired_at(Utc::now()) {
            debug!(token_id = %token.id, expires_at = %token.expires_at, "Rejecting expired token");
            return Ok(None);
        }

        Ok(Some(token))
    }

    /// Check that `secret` names a usable token granting `right`
    ///
    /// Only the rights are checked. The grant is not bound to a particular
    /// project, and its recorded scope is not consulted. A token holding
    /// `Write` can therefore add members to any project, its holder included.
    pub async fn validate(&self, secret: &str, right: Right) -> Result<bool, StorageError> {
        Ok(self
            .find_usable(secret)
            .await?
            .map(|token| token.grant.has_right(right))
            .unwrap_or(false))
    }

    /// Summaries of every token issued to `owner`, without secrets
    pub async fn list_for(&self, owner: &Identity) -> Result<Vec<TokenSummary>, StorageError> {
        Ok(self
            .storage
            .list_tokens_for(owner)
            .await?
            .iter()
            .map(ApiToken::summary)
            .collect())
    }
}

#[async_trait]
impl TokenGrantBackend for TokenStore {
    async fn find_grant(&self, secret: &str) -> sciobj_bridge::Result<Option<TokenGrant>> {
        self.find_usable(secret)
            .await
            .map(|token| token.map(|t| t.grant))
            .map_err(|e| BridgeError::TokenLookupFailed(e.to_string()))
    }

    fn description(&self) -> &str {
        "token store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store(config: TokenConfig) -> TokenStore {
        TokenStore::new(Arc::new(MemoryStore::new()), config)
    }

    #[tokio::test]
    async fn test_issue_and_validate() {
        let tokens = store(TokenConfig::default());
        let token = tokens
            .issue(Identity::new("alice"), BTreeSet::from([Right::Read]), ResourceKind::Project)
            .await
            .unwrap();

        // 64 random bytes, unpadded base64
        assert_eq!(token.secret.len(), 86);
        assert!(tokens.validate(&token.secret, Right::Read).await.unwrap());
        assert!(!tokens.validate(&token.secret, Right::Write).await.unwrap());
        assert!(!tokens.validate("not-a-token", Right::Read).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_hides_secret() {
        let tokens = store(TokenConfig::default());
        tokens
            .issue(Identity::new("alice"), BTreeSet::from([Right::Read]), ResourceKind::Project)
            .await
            .unwrap();

        let listed = tokens.list_for(&Identity::new("alice")).await.unwrap();
        assert_eq!(listed.len(), 1);
        let json = serde_json::to_string(&listed[0]).unwrap();
        assert!(!json.contains("secret"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let tokens = store(TokenConfig {
            secret_bytes: 0,
            ..TokenConfig::default()
        });
        let result = tokens
            .issue(Identity::new("alice"), BTreeSet::new(), ResourceKind::Project)
            .await;
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    async fn expired_token(storage: &Arc<MemoryStore>) -> String {
        let grant = TokenGrant::new(Identity::new("alice"), [Right::Read], ResourceKind::Project);
        let mut token = ApiToken::issue(grant, 32, chrono::Duration::days(1)).unwrap();
        token.expires_at = Utc::now() - chrono::Duration::days(1);
        let secret = token.secret.clone();
        storage.insert_token(token).await.unwrap();
        secret
    }

    #[tokio::test]
    async fn test_expiry_not_enforced_by_default() {
        let storage = Arc::new(MemoryStore::new());
        let secret = expired_token(&storage).await;
        let tokens = TokenStore::new(storage, TokenConfig::default());

        assert!(tokens.validate(&secret, Right::Read).await.unwrap());
        assert!(tokens.find_grant(&secret).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expiry_enforced_when_enabled() {
        let storage = Arc::new(MemoryStore::new());
        let secret = expired_token(&storage).await;
        let tokens = TokenStore::new(
            storage,
            TokenConfig {
                enforce_expiry: true,
                ..TokenConfig::default()
            },
        );

        assert!(!tokens.validate(&secret, Right::Read).await.unwrap());
        assert!(tokens.find_grant(&secret).await.unwrap().is_none());
    }
}
