//! PostgreSQL implementation of ApiKeyRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::api_key::{ApiKey, ApiKeyPermission, ApiKeyPermissions};
use crate::domain::foundation::{ApiKeyId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::ApiKeyRepository;

/// PostgreSQL implementation of the ApiKeyRepository port.
///
/// Only the SHA-256 hash of each secret is stored; lookups go through
/// the unique index on `key_hash`.
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an API key.
#[derive(Debug, sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    user_id: String,
    name: String,
    key_hash: String,
    permissions: Vec<String>,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    last_used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ApiKeyRow> for ApiKey {
    type Error = DomainError;

    fn try_from(row: ApiKeyRow) -> Result<Self, Self::Error> {
        let permissions: Vec<ApiKeyPermission> = row
            .permissions
            .iter()
            .map(|raw| {
                ApiKeyPermission::from_stored(raw).ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid permission: {}", raw),
                    )
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(ApiKey {
            id: ApiKeyId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            name: row.name,
            key_hash: row.key_hash,
            permissions: ApiKeyPermissions::new(permissions),
            is_active: row.is_active,
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            last_used_at: row.last_used_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn storage_error(operation: &'static str, error: sqlx::Error) -> DomainError {
    tracing::error!(operation, error = %error, "api key repository query failed");
    DomainError::database(operation)
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn insert(&self, key: &ApiKey) -> Result<(), DomainError> {
        let permissions: Vec<String> =
            key.permissions.iter().map(|p| p.as_str().to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO api_keys (
                id, user_id, name, key_hash, permissions,
                is_active, expires_at, last_used_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(key.id.as_uuid())
        .bind(key.user_id.as_str())
        .bind(&key.name)
        .bind(&key.key_hash)
        .bind(&permissions)
        .bind(key.is_active)
        .bind(key.expires_at.map(|t| *t.as_datetime()))
        .bind(key.last_used_at.map(|t| *t.as_datetime()))
        .bind(key.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("insert_api_key", e))?;
        Ok(())
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        let row: Option<ApiKeyRow> =
            sqlx::query_as("SELECT * FROM api_keys WHERE key_hash = $1")
                .bind(key_hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_error("find_api_key", e))?;
        row.map(ApiKey::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, DomainError> {
        let rows: Vec<ApiKeyRow> =
            sqlx::query_as("SELECT * FROM api_keys WHERE user_id = $1 ORDER BY created_at")
                .bind(user_id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| storage_error("list_api_keys", e))?;
        rows.into_iter().map(ApiKey::try_from).collect()
    }

    async fn touch_last_used(&self, id: ApiKeyId, at: Timestamp) -> Result<(), DomainError> {
        sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("touch_api_key", e))?;
        Ok(())
    }

    async fn deactivate(&self, id: ApiKeyId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("deactivate_api_key", e))?;
        if result.rows_affected() == 0 {
            return Err(
                DomainError::new(ErrorCode::ApiKeyNotFound, "API key not found")
                    .with_detail("api_key_id", id.to_string()),
            );
        }
        Ok(())
    }
}
