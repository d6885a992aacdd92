//! In-memory role cache.
//!
//! Per-process only: in a multi-instance deployment each process holds
//! its own cache, so role mutations must be followed by an eviction on
//! every instance (or a distributed [`RoleCache`] backend used instead).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::foundation::{UserId, UserRole};
use crate::ports::RoleCache;

#[derive(Debug, Clone, Copy)]
struct CachedRole {
    role: UserRole,
    expires_at: Instant,
}

/// In-memory TTL implementation of [`RoleCache`].
#[derive(Debug, Default)]
pub struct InMemoryRoleCache {
    entries: Arc<RwLock<HashMap<String, CachedRole>>>,
}

impl InMemoryRoleCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleCache for InMemoryRoleCache {
    async fn get(&self, user_id: &UserId) -> Option<UserRole> {
        let entries = self.entries.read().await;
        entries
            .get(user_id.as_str())
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| cached.role)
    }

    async fn put(&self, user_id: &UserId, role: UserRole, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            user_id.to_string(),
            CachedRole {
                role,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn evict(&self, user_id: &UserId) {
        let mut entries = self.entries.write().await;
        entries.remove(user_id.as_str());
    }

    async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}
