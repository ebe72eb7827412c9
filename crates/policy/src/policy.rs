//! Policy configuration and enforcement.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Operations gated behind confirmation unless configured otherwise.
pub const DEFAULT_CONFIRM_OPERATIONS: &[&str] = &["delete_deployment", "recreate", "stop", "cck"];

/// Default confirmation token lifetime.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 300;

/// Policy configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Confirmation token lifetime in seconds.
    pub token_ttl: u64,

    /// Operations that need a confirmation token. Empty means the defaults.
    pub confirm_operations: HashSet<String>,

    /// Operations that are always refused (overrides confirmation).
    pub blocked_operations: HashSet<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            token_ttl: DEFAULT_TOKEN_TTL_SECS,
            confirm_operations: DEFAULT_CONFIRM_OPERATIONS
                .iter()
                .map(|op| op.to_string())
                .collect(),
            blocked_operations: HashSet::new(),
        }
    }
}

impl Policy {
    /// Parse policy from TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let policy: Self = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_ttl == 0 {
            return Err(Error::Invalid("token_ttl must be greater than zero".into()));
        }
        Ok(())
    }

    /// Check if an operation needs a confirmation token.
    pub fn requires_confirmation(&self, operation: &str) -> bool {
        if self.confirm_operations.is_empty() {
            return DEFAULT_CONFIRM_OPERATIONS.contains(&operation);
        }
        self.confirm_operations.contains(operation)
    }

    /// Check if an operation is refused outright.
    pub fn is_blocked(&self, operation: &str) -> bool {
        self.blocked_operations.contains(operation)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl)
    }
}
