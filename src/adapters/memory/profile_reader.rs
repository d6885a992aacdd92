//! In-memory profile reader for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::ProfileReader;

/// In-memory implementation of [`ProfileReader`].
///
/// Stores raw role strings exactly as a loosely-typed profile table
/// would, and can be made to fail so tests can verify fail-secure
/// behavior in the access control service.
#[derive(Debug, Default)]
pub struct InMemoryProfileReader {
    roles: Arc<RwLock<HashMap<String, String>>>,
    failing: AtomicBool,
}

impl InMemoryProfileReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's raw stored role.
    pub async fn set_role(&self, user_id: &UserId, raw_role: impl Into<String>) {
        let mut roles = self.roles.write().await;
        roles.insert(user_id.to_string(), raw_role.into());
    }

    /// Makes every subsequent lookup fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileReader for InMemoryProfileReader {
    async fn fetch_role(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "profile store unavailable",
            ));
        }
        let roles = self.roles.read().await;
        Ok(roles.get(user_id.as_str()).cloned())
    }
}
