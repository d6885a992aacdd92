//! API key persistence port.

use async_trait::async_trait;

use crate::domain::api_key::ApiKey;
use crate::domain::foundation::{ApiKeyId, DomainError, Timestamp, UserId};

/// Port for API key storage. Keys are stored and looked up by the hash
/// of their secret; the secret itself never reaches this port.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Persists a new key record.
    async fn insert(&self, key: &ApiKey) -> Result<(), DomainError>;

    /// Looks up a key by the hash of its secret.
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError>;

    /// Lists a user's keys.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError>;

    /// Records when the key was last used.
    async fn touch_last_used(&self, id: ApiKeyId, at: Timestamp) -> Result<(), DomainError>;

    /// Deactivates a key. Deactivation is permanent.
    async fn deactivate(&self, id: ApiKeyId) -> Result<(), DomainError>;
}
