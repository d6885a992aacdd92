//! In-memory API key repository for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::ApiKey;
use crate::domain::foundation::{ApiKeyId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::ApiKeyRepository;

/// In-memory implementation of [`ApiKeyRepository`].
///
/// `touch_last_used` can be made to fail so tests can verify that a
/// failed touch never fails validation.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: Arc<RwLock<HashMap<ApiKeyId, ApiKey>>>,
    touch_failing: AtomicBool,
}

impl InMemoryApiKeyRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `touch_last_used` fail (or succeed again).
    pub fn set_touch_failing(&self, failing: bool) {
        self.touch_failing.store(failing, Ordering::SeqCst);
    }

    /// Loads a key by id (test helper).
    pub async fn find_by_id(&self, id: ApiKeyId) -> Option<ApiKey> {
        let keys = self.keys.read().await;
        keys.get(&id).cloned()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn insert(&self, key: &ApiKey) -> Result<(), DomainError> {
        let mut keys = self.keys.write().await;
        keys.insert(key.id, key.clone());
        Ok(())
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        Ok(keys.values().find(|k| k.key_hash == key_hash).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().await;
        let mut result: Vec<ApiKey> = keys
            .values()
            .filter(|k| &k.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|k| k.created_at);
        Ok(result)
    }

    async fn touch_last_used(&self, id: ApiKeyId, at: Timestamp) -> Result<(), DomainError> {
        if self.touch_failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "api key store unavailable",
            ));
        }
        let mut keys = self.keys.write().await;
        if let Some(key) = keys.get_mut(&id) {
            key.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn deactivate(&self, id: ApiKeyId) -> Result<(), DomainError> {
        let mut keys = self.keys.write().await;
        match keys.get_mut(&id) {
            Some(key) => {
                key.is_active = false;
                Ok(())
            }
            None => Err(DomainError::new(ErrorCode::ApiKeyNotFound, "API key not found")
                .with_detail("api_key_id", id.to_string())),
        }
    }
}
