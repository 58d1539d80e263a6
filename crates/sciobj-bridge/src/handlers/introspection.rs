//! Delegated Token Handler
//!
//! Resolves tokens from an external OAuth2 provider by calling its userinfo
//! endpoint with the token as bearer credential.

use async_trait::async_trait;
use sciobj_core::Identity;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::bridge::CredentialHandler;
use crate::error::{BridgeError, Result};
use crate::types::{CredentialKind, Resolved};

/// Configuration for the introspection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionConfig {
    /// Userinfo endpoint URL
    pub endpoint_url: String,

    /// Claim holding the stable user id (default: "sub")
    #[serde(default = "default_identity_claim")]
    pub identity_claim: String,

    /// Request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

fn default_identity_claim() -> String {
    "sub".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl IntrospectionConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            identity_claim: default_identity_claim(),
            timeout: default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_identity_claim(mut self, claim: impl Into<String>) -> Self {
        self.identity_claim = claim.into();
        self
    }
}

/// Delegated token handler backed by an OAuth2 userinfo endpoint
pub struct IntrospectionHandler {
    config: IntrospectionConfig,
    http_client: reqwest::Client,
}

impl IntrospectionHandler {
    pub fn new(config: IntrospectionConfig) -> Result<Self> {
        if config.endpoint_url.is_empty() {
            return Err(BridgeError::InvalidConfig(
                "introspection endpoint URL must be set".into(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BridgeError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl CredentialHandler for IntrospectionHandler {
    fn credential_kind(&self) -> CredentialKind {
        CredentialKind::ExternalDelegated
    }

    fn description(&self) -> &str {
        "OAuth2 userinfo introspection handler"
    }

    async fn resolve(&self, raw_token: &str) -> Result<Resolved> {
        debug!(url = %self.config.endpoint_url, "Requesting userinfo");

        let response = self
            .http_client
            .get(&self.config.endpoint_url)
            .bearer_auth(raw_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::IdentityResolutionFailed(format!(
                "bad response when requesting userinfo: {}",
                status
            )));
        }

        let body: serde_json::Value = response.json().await?;

        let subject = body
            .get(&self.config.identity_claim)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                BridgeError::IdentityResolutionFailed(format!(
                    "could not read '{}' claim from userinfo response",
                    self.config.identity_claim
                ))
            })?;

        Ok(Resolved::Identity(Identity::new(subject)))
    }
}
