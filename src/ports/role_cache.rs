//! Role cache port.
//!
//! The access control service caches normalized roles for a fixed TTL.
//! The cache is behind this port so a distributed KV can replace the
//! default in-memory map for multi-instance deployments; the default is
//! per-process only.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::{UserId, UserRole};

/// Port for the TTL cache of normalized user roles.
///
/// Cache failures are never allowed to fail a privilege check; methods
/// are infallible and implementations degrade to misses internally.
#[async_trait]
pub trait RoleCache: Send + Sync {
    /// Returns the cached role if present and not expired.
    async fn get(&self, user_id: &UserId) -> Option<UserRole>;

    /// Stores a role for the given TTL.
    async fn put(&self, user_id: &UserId, role: UserRole, ttl: Duration);

    /// Evicts one user's entry.
    async fn evict(&self, user_id: &UserId);

    /// Evicts every entry.
    async fn clear(&self);
}
