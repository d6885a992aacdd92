//! Rate limiting port.
//!
//! Fixed-window counters keyed per (actor, action). The default backend
//! is in-memory and therefore correct only within a single process
//! instance; that relaxation is deliberate and documented on the
//! adapter. A distributed backend can implement the same port.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::domain::foundation::{DomainError, Timestamp, UserId};

/// Identifies what is being limited: one actor performing one action.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub actor: String,
    pub action: String,
}

impl RateLimitKey {
    /// Key for an authenticated user performing an action.
    pub fn user(user_id: &UserId, action: &str) -> Self {
        Self {
            actor: user_id.to_string(),
            action: action.to_string(),
        }
    }

    /// Key for an unauthenticated caller identified by IP.
    pub fn ip(ip: &str, action: &str) -> Self {
        Self {
            actor: ip.to_string(),
            action: action.to_string(),
        }
    }

    /// Canonical string form used as the backing store key.
    pub fn as_store_key(&self) -> String {
        format!("ratelimit:{}:{}", self.actor, self.action)
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.actor, self.action)
    }
}

/// Decision from a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request allowed; a token was consumed.
    Allowed {
        limit: u32,
        remaining: u32,
        reset_at: Timestamp,
    },
    /// Request denied; the window is exhausted.
    Denied { limit: u32, retry_after_secs: u32 },
}

impl RateLimitDecision {
    /// Returns true if the request was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }

    /// Converts a denial into a `RateLimited` domain error.
    pub fn into_result(self) -> Result<(), DomainError> {
        match self {
            RateLimitDecision::Allowed { .. } => Ok(()),
            RateLimitDecision::Denied {
                limit,
                retry_after_secs,
            } => Err(DomainError::new(
                crate::domain::foundation::ErrorCode::RateLimited,
                format!("Rate limit of {} exceeded; retry in {}s", limit, retry_after_secs),
            )
            .with_detail("retry_after_secs", retry_after_secs.to_string())),
        }
    }
}

/// Port for rate limiting.
///
/// Implementations must tolerate concurrent checks on the same key
/// without losing counts.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Checks and consumes one token for the key under the given limit
    /// and window.
    async fn check(
        &self,
        key: RateLimitKey,
        max: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, DomainError>;

    /// Clears the window for a key, restoring full quota.
    async fn reset(&self, key: RateLimitKey) -> Result<(), DomainError>;
}
