use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::Result;

/// Prefix on every issued token.
pub const TOKEN_PREFIX: &str = "tok_";

/// Default token lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

const TOKEN_BYTES: usize = 16;

/// What a token was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToken {
    pub operation: String,
    pub resource: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory store of outstanding confirmation tokens.
///
/// Safe to share between tasks; every operation takes one short lock.
#[derive(Debug)]
pub struct TokenStore {
    ttl: Duration,
    tokens: Mutex<HashMap<String, PendingToken>>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl TokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingToken>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Issue a token for `operation` on `resource`.
    pub fn generate(&self, operation: &str, resource: &str) -> Result<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        let token = format!("{TOKEN_PREFIX}{}", hex::encode(bytes));

        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.lock().insert(
            token.clone(),
            PendingToken {
                operation: operation.to_string(),
                resource: resource.to_string(),
                expires_at,
            },
        );
        tracing::debug!(operation, resource, "issued confirmation token");
        Ok(token)
    }

    /// Redeem `token` for `operation` on `resource`.
    ///
    /// Returns true at most once per token. A token presented for a
    /// different operation or resource is rejected but stays redeemable;
    /// an expired one is dropped.
    pub fn validate(&self, token: &str, operation: &str, resource: &str) -> bool {
        let mut tokens = self.lock();
        let Some(pending) = tokens.get(token) else {
            return false;
        };

        if pending.is_expired(Utc::now()) {
            tokens.remove(token);
            return false;
        }
        if pending.operation != operation || pending.resource != resource {
            tracing::warn!(operation, resource, "confirmation token presented for another target");
            return false;
        }

        tokens.remove(token);
        true
    }

    /// Look at a token without consuming it. Expired tokens are dropped.
    pub fn get_pending(&self, token: &str) -> Option<PendingToken> {
        let mut tokens = self.lock();
        let pending = tokens.get(token)?;
        if pending.is_expired(Utc::now()) {
            tokens.remove(token);
            return None;
        }
        Some(pending.clone())
    }

    /// Drop every expired token. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut tokens = self.lock();
        let before = tokens.len();
        tokens.retain(|_, pending| !pending.is_expired(now));
        before - tokens.len()
    }

    /// Number of outstanding tokens, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
