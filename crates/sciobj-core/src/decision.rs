//! Authorization outcomes

use serde::{Deserialize, Serialize};

/// Result of the final membership/grant check
///
/// `Failed` carries the internal cause of a backend error during the check.
/// Callers outside the service must treat it exactly like `Denied`; the cause
/// is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "cause", rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied,
    Failed(String),
}

impl Decision {
    pub fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allowed
        } else {
            Decision::Denied
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_is_not_allowed() {
        assert!(Decision::Allowed.is_allowed());
        assert!(!Decision::Denied.is_allowed());
        assert!(!Decision::Failed("db down".into()).is_allowed());
        assert_eq!(Decision::from_bool(false), Decision::Denied);
    }
}
