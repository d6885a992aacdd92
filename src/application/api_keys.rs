//! API key lifecycle: creation, validation, revocation.

use std::sync::Arc;

use crate::domain::api_key::{
    generate_api_key, hash_api_key, ApiKey, ApiKeyPermissions, ApiKeyRejection, ApiKeyValidation,
};
use crate::domain::foundation::{ApiKeyId, DomainError, Timestamp, UserId};
use crate::ports::ApiKeyRepository;

/// Result of creating an API key. The raw secret appears here and
/// nowhere else; only its hash is stored.
#[derive(Debug, Clone)]
pub struct CreatedApiKey {
    pub id: ApiKeyId,
    /// The raw secret, shown to the caller exactly once.
    pub api_key: String,
}

/// Creates and validates API keys against their stored hashes.
pub struct ApiKeyService {
    keys: Arc<dyn ApiKeyRepository>,
}

impl ApiKeyService {
    pub fn new(keys: Arc<dyn ApiKeyRepository>) -> Self {
        Self { keys }
    }

    /// Generates a new key for the user and persists its hash.
    pub async fn create_api_key(
        &self,
        user_id: UserId,
        name: impl Into<String>,
        permissions: ApiKeyPermissions,
        expires_at: Option<Timestamp>,
    ) -> Result<CreatedApiKey, DomainError> {
        let secret = generate_api_key();
        let key = ApiKey::new(user_id, name, hash_api_key(&secret), permissions, expires_at)?;
        self.keys.insert(&key).await?;
        Ok(CreatedApiKey {
            id: key.id,
            api_key: secret,
        })
    }

    /// Validates a presented credential.
    ///
    /// Accepts either the bare secret or an `Authorization`-style
    /// `Bearer <secret>` value. Not-found, inactive, and expired are
    /// distinct rejections; none of them touches `last_used_at`.
    pub async fn validate_api_key(
        &self,
        credential: &str,
    ) -> Result<ApiKeyValidation, DomainError> {
        let secret = credential
            .strip_prefix("Bearer ")
            .unwrap_or(credential)
            .trim();

        let key = match self.keys.find_by_hash(&hash_api_key(secret)).await? {
            Some(key) => key,
            None => return Ok(ApiKeyValidation::invalid(ApiKeyRejection::NotFound)),
        };

        let now = Timestamp::now();
        if let Err(rejection) = key.check_usable(now) {
            return Ok(ApiKeyValidation::invalid(rejection));
        }

        // Best-effort: a failed touch must not fail validation.
        if let Err(error) = self.keys.touch_last_used(key.id, now).await {
            tracing::warn!(api_key_id = %key.id, %error, "failed to record api key use");
        }

        Ok(ApiKeyValidation::valid(key.user_id, key.permissions))
    }

    /// Lists a user's keys (hashes only, never secrets).
    pub async fn list_api_keys(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        self.keys.list_for_user(user_id).await
    }

    /// Permanently deactivates a key.
    pub async fn revoke_api_key(&self, id: ApiKeyId) -> Result<(), DomainError> {
        self.keys.deactivate(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryApiKeyRepository;
    use crate::domain::api_key::{ApiKeyPermission, API_KEY_PREFIX};

    fn owner() -> UserId {
        UserId::new("vendor-1").unwrap()
    }

    fn perms() -> ApiKeyPermissions {
        ApiKeyPermissions::new([ApiKeyPermission::Read, ApiKeyPermission::Write])
    }

    fn service() -> (ApiKeyService, Arc<InMemoryApiKeyRepository>) {
        let repo = Arc::new(InMemoryApiKeyRepository::new());
        (ApiKeyService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn created_key_validates_round_trip() {
        let (service, _) = service();
        let created = service
            .create_api_key(owner(), "integration", perms(), None)
            .await
            .unwrap();
        assert!(created.api_key.starts_with(API_KEY_PREFIX));

        let validation = service.validate_api_key(&created.api_key).await.unwrap();
        assert!(validation.valid);
        assert_eq!(validation.user_id, Some(owner()));
        assert!(validation
            .permissions
            .unwrap()
            .allows(ApiKeyPermission::Write));
    }

    #[tokio::test]
    async fn bearer_prefix_is_accepted() {
        let (service, _) = service();
        let created = service
            .create_api_key(owner(), "integration", perms(), None)
            .await
            .unwrap();

        let validation = service
            .validate_api_key(&format!("Bearer {}", created.api_key))
            .await
            .unwrap();
        assert!(validation.valid);
    }

    #[tokio::test]
    async fn unknown_secret_is_not_found() {
        let (service, _) = service();
        let validation = service.validate_api_key("qd_definitely_wrong").await.unwrap();
        assert!(!validation.valid);
        assert_eq!(validation.error, Some(ApiKeyRejection::NotFound));
        assert!(validation.user_id.is_none());
    }

    #[tokio::test]
    async fn expired_key_is_rejected_without_touching_last_used() {
        let (service, repo) = service();
        let created = service
            .create_api_key(
                owner(),
                "stale",
                perms(),
                Some(Timestamp::now().minus_days(1)),
            )
            .await
            .unwrap();

        let validation = service.validate_api_key(&created.api_key).await.unwrap();
        assert!(!validation.valid);
        assert_eq!(validation.error, Some(ApiKeyRejection::Expired));

        let stored = repo.find_by_id(created.id).await.unwrap();
        assert!(stored.last_used_at.is_none());
    }

    #[tokio::test]
    async fn revoked_key_is_rejected_as_inactive() {
        let (service, _) = service();
        let created = service
            .create_api_key(owner(), "revoked", perms(), None)
            .await
            .unwrap();
        service.revoke_api_key(created.id).await.unwrap();

        let validation = service.validate_api_key(&created.api_key).await.unwrap();
        assert_eq!(validation.error, Some(ApiKeyRejection::Inactive));
    }

    #[tokio::test]
    async fn failed_touch_does_not_fail_validation() {
        let (service, repo) = service();
        let created = service
            .create_api_key(owner(), "integration", perms(), None)
            .await
            .unwrap();

        repo.set_touch_failing(true);
        let validation = service.validate_api_key(&created.api_key).await.unwrap();
        assert!(validation.valid);
    }

    #[tokio::test]
    async fn valid_key_gets_a_last_used_touch() {
        let (service, repo) = service();
        let created = service
            .create_api_key(owner(), "integration", perms(), None)
            .await
            .unwrap();

        service.validate_api_key(&created.api_key).await.unwrap();
        let stored = repo.find_by_id(created.id).await.unwrap();
        assert!(stored.last_used_at.is_some());
    }
}
