//! Profile store port for role resolution.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Port for reading user profiles.
///
/// The stored role is a loosely-typed string; normalization into
/// [`crate::domain::foundation::UserRole`] happens in the access control
/// service, not here.
#[async_trait]
pub trait ProfileReader: Send + Sync {
    /// Returns the raw stored role for a user, or `None` if the user has
    /// no profile.
    async fn fetch_role(&self, user_id: &UserId) -> Result<Option<String>, DomainError>;
}
