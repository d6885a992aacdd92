//! API key record and validation outcome types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{ApiKeyId, Timestamp, UserId, ValidationError};

/// A single capability granted to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyPermission {
    Read,
    Write,
    Admin,
}

impl ApiKeyPermission {
    /// Returns the canonical stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyPermission::Read => "read",
            ApiKeyPermission::Write => "write",
            ApiKeyPermission::Admin => "admin",
        }
    }

    /// Parses a stored permission value.
    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw {
            "read" => Some(ApiKeyPermission::Read),
            "write" => Some(ApiKeyPermission::Write),
            "admin" => Some(ApiKeyPermission::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for ApiKeyPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The permission set carried by a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyPermissions(BTreeSet<ApiKeyPermission>);

impl ApiKeyPermissions {
    /// Builds a permission set, deduplicating the input.
    pub fn new(permissions: impl IntoIterator<Item = ApiKeyPermission>) -> Self {
        Self(permissions.into_iter().collect())
    }

    /// Whether the set grants the given permission.
    ///
    /// `admin` implies `read` and `write`.
    pub fn allows(&self, permission: ApiKeyPermission) -> bool {
        self.0.contains(&permission) || self.0.contains(&ApiKeyPermission::Admin)
    }

    /// Whether the set literally contains the permission (no implication).
    pub fn contains(&self, permission: ApiKeyPermission) -> bool {
        self.0.contains(&permission)
    }

    /// Iterates the permissions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &ApiKeyPermission> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Long-lived hashed credential, alternative to session authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub user_id: UserId,
    pub name: String,
    /// SHA-256 hash of the secret. The secret itself is never stored.
    pub key_hash: String,
    pub permissions: ApiKeyPermissions,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ApiKey {
    /// Creates a new active API key record for an already-hashed secret.
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        key_hash: impl Into<String>,
        permissions: ApiKeyPermissions,
        expires_at: Option<Timestamp>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            id: ApiKeyId::new(),
            user_id,
            name,
            key_hash: key_hash.into(),
            permissions,
            is_active: true,
            expires_at,
            last_used_at: None,
            created_at: Timestamp::now(),
        })
    }

    /// Whether the key is past its expiry at the given instant.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry.is_before(&now))
    }

    /// Checks the key is usable right now: active and not expired.
    pub fn check_usable(&self, now: Timestamp) -> Result<(), ApiKeyRejection> {
        if !self.is_active {
            return Err(ApiKeyRejection::Inactive);
        }
        if self.is_expired(now) {
            return Err(ApiKeyRejection::Expired);
        }
        Ok(())
    }
}

/// Why an API key credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiKeyRejection {
    #[error("Unknown API key")]
    NotFound,

    #[error("API key has been deactivated")]
    Inactive,

    #[error("API key has expired")]
    Expired,
}

/// Outcome of validating an API key credential.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyValidation {
    pub valid: bool,
    pub user_id: Option<UserId>,
    pub permissions: Option<ApiKeyPermissions>,
    pub error: Option<ApiKeyRejection>,
}

impl ApiKeyValidation {
    /// Successful validation carrying the key's identity and permissions.
    pub fn valid(user_id: UserId, permissions: ApiKeyPermissions) -> Self {
        Self {
            valid: true,
            user_id: Some(user_id),
            permissions: Some(permissions),
            error: None,
        }
    }

    /// Failed validation with a specific rejection.
    pub fn invalid(error: ApiKeyRejection) -> Self {
        Self {
            valid: false,
            user_id: None,
            permissions: None,
            error: Some(error),
        }
    }
}
