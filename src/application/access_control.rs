//! Role resolution with fail-secure normalization and a TTL cache.
//!
//! Any ambiguity resolves to the least-privileged role: a missing
//! profile, a garbage stored value, or a failed lookup all yield
//! `Vendor`. Privilege is only ever granted on a clean `admin` read.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{DomainError, UserId, UserRole};
use crate::ports::{ProfileReader, RoleCache};

/// Default TTL for cached roles.
pub const DEFAULT_ROLE_CACHE_TTL: Duration = Duration::from_secs(300);

/// Resolves and caches user roles.
pub struct AccessControl {
    profiles: Arc<dyn ProfileReader>,
    cache: Arc<dyn RoleCache>,
    cache_ttl: Duration,
}

impl AccessControl {
    pub fn new(
        profiles: Arc<dyn ProfileReader>,
        cache: Arc<dyn RoleCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            profiles,
            cache,
            cache_ttl,
        }
    }

    /// Resolves the user's normalized role, consulting the cache first.
    ///
    /// Lookup failures are logged and resolve to `Vendor`; they are not
    /// cached, so a transient store outage cannot pin a user to the
    /// wrong role for a full TTL.
    pub async fn resolve_role(&self, user_id: &UserId) -> UserRole {
        if let Some(role) = self.cache.get(user_id).await {
            return role;
        }

        match self.profiles.fetch_role(user_id).await {
            Ok(stored) => {
                let role = stored
                    .as_deref()
                    .map(UserRole::from_stored)
                    .unwrap_or_default();
                self.cache.put(user_id, role, self.cache_ttl).await;
                role
            }
            Err(error) => {
                tracing::warn!(
                    user_id = %user_id,
                    %error,
                    "role lookup failed, defaulting to vendor"
                );
                UserRole::Vendor
            }
        }
    }

    /// Whether the user holds the admin role.
    pub async fn check_admin(&self, user_id: &UserId) -> bool {
        self.resolve_role(user_id).await.is_admin()
    }

    /// Fails with `Forbidden` unless the user is an admin.
    pub async fn require_admin(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.check_admin(user_id).await {
            return Ok(());
        }
        Err(DomainError::forbidden("Admin role required")
            .with_detail("user_id", user_id.to_string()))
    }

    /// Evicts one user's cached role, or the whole cache.
    ///
    /// Must be called right after any role mutation so a stale
    /// elevated or demoted privilege is never served from cache.
    pub async fn clear_role_cache(&self, user_id: Option<&UserId>) {
        match user_id {
            Some(user_id) => self.cache.evict(user_id).await,
            None => self.cache.clear().await,
        }
    }
}
