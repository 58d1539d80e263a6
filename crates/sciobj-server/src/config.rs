//! Server configuration
//!
//! Read from `SCIOBJ_*` environment variables:
//!
//! | Variable | Default |
//! |---|---|
//! | `SCIOBJ_PORT` | `8080` |
//! | `SCIOBJ_LOG_LEVEL` | `info` |
//! | `SCIOBJ_INTROSPECTION_URL` | required |
//! | `SCIOBJ_TOKEN_LENGTH` | `64` |
//! | `SCIOBJ_TOKEN_TTL_DAYS` | `365` |
//! | `SCIOBJ_ENFORCE_TOKEN_EXPIRY` | `false` |
//! | `SCIOBJ_LOOKUP_TIMEOUT_MS` | `5000` |
//! | `SCIOBJ_OWNERSHIP_CACHE_TTL_SECS` | `300`, `0` disables the cache |
//! | `SCIOBJ_REVISION_MAX_ATTEMPTS` | `16` |
//! | `SCIOBJ_DATABASE_URL` | unset; only read with the `postgres` feature |

use sciobj_bridge::handlers::IntrospectionConfig;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::core::{HierarchyConfig, RevisionConfig, TokenConfig};

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
    pub introspection: IntrospectionConfig,
    pub tokens: TokenConfig,
    pub hierarchy: HierarchyConfig,
    pub revisions: RevisionConfig,
    pub database_url: Option<String>,
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let introspection_url = vars
            .get("SCIOBJ_INTROSPECTION_URL")
            .ok_or(ConfigError::Missing("SCIOBJ_INTROSPECTION_URL"))?;

        let lookup_timeout = Duration::from_millis(vars.parse("SCIOBJ_LOOKUP_TIMEOUT_MS", 5000u64)?);
        if lookup_timeout.is_zero() {
            return Err(invalid("SCIOBJ_LOOKUP_TIMEOUT_MS", "0", "must be positive"));
        }

        let cache_ttl_secs: u64 = vars.parse("SCIOBJ_OWNERSHIP_CACHE_TTL_SECS", 300)?;

        let token_length: usize = vars.parse("SCIOBJ_TOKEN_LENGTH", 64)?;
        if token_length == 0 {
            return Err(invalid("SCIOBJ_TOKEN_LENGTH", "0", "must be positive"));
        }

        let ttl_days: i64 = vars.parse("SCIOBJ_TOKEN_TTL_DAYS", 365)?;
        if !(1..=36_500).contains(&ttl_days) {
            return Err(invalid(
                "SCIOBJ_TOKEN_TTL_DAYS",
                ttl_days,
                "must be between 1 and 36500",
            ));
        }

        let max_attempts: u32 = vars.parse("SCIOBJ_REVISION_MAX_ATTEMPTS", 16)?;
        if max_attempts == 0 {
            return Err(invalid("SCIOBJ_REVISION_MAX_ATTEMPTS", "0", "must be positive"));
        }

        Ok(Self {
            port: vars.parse("SCIOBJ_PORT", 8080)?,
            log_level: vars.get("SCIOBJ_LOG_LEVEL").unwrap_or_else(|| "info".into()),
            introspection: IntrospectionConfig::new(introspection_url).with_timeout(lookup_timeout),
            tokens: TokenConfig {
                secret_bytes: token_length,
                ttl_days,
                enforce_expiry: vars.parse("SCIOBJ_ENFORCE_TOKEN_EXPIRY", false)?,
            },
            hierarchy: HierarchyConfig {
                lookup_timeout,
                cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
                ..HierarchyConfig::default()
            },
            revisions: RevisionConfig { max_attempts },
            database_url: vars.get("SCIOBJ_DATABASE_URL"),
        })
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// A variable's value; empty counts as unset
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| invalid(name, raw.as_str(), e)),
            None => Ok(default),
        }
    }
}

fn invalid(name: &'static str, value: impl Display, reason: impl Display) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
