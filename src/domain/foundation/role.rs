//! User role as a closed sum type.
//!
//! The profile store holds the role as a loosely-typed string. It is
//! normalized exactly once, here, at the data boundary; everything else
//! in the crate branches on the enum. Anything unrecognized resolves to
//! the least-privileged role (fail-secure).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Privilege level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full privileges, including protected-state mutations.
    Admin,
    /// Owns and manages their own quotes only.
    Vendor,
}

impl UserRole {
    /// Normalizes a raw stored role value.
    ///
    /// Trims whitespace and lowercases before matching. Unknown values
    /// map to `Vendor`, never to `Admin`.
    pub fn from_stored(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "admin" => UserRole::Admin,
            _ => UserRole::Vendor,
        }
    }

    /// Returns true for the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Returns the canonical stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Vendor => "vendor",
        }
    }
}

impl Default for UserRole {
    /// Least privilege by default.
    fn default() -> Self {
        UserRole::Vendor
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
