//! PostgreSQL implementation of ProfileReader.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::ProfileReader;

/// Reads user roles from the `profiles` table.
pub struct PostgresProfileReader {
    pool: PgPool,
}

impl PostgresProfileReader {
    /// Creates a new reader over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileReader for PostgresProfileReader {
    async fn fetch_role(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar("SELECT role FROM profiles WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "profile lookup failed");
                DomainError::database("fetch_role")
            })
    }
}
