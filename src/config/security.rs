//! Security configuration: rate limiting and role caching.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Security configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Default maximum requests per rate-limit window
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    /// Rate-limit window length in seconds
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    /// TTL for cached user roles in seconds
    #[serde(default = "default_role_cache_ttl")]
    pub role_cache_ttl_secs: u64,
}

impl SecurityConfig {
    /// Get the rate-limit window as Duration
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Get the role cache TTL as Duration
    pub fn role_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.role_cache_ttl_secs)
    }

    /// Validate security configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rate_limit_max == 0 {
            return Err(ValidationError::InvalidRateLimit);
        }
        if self.rate_limit_window_secs == 0 {
            return Err(ValidationError::InvalidRateLimitWindow);
        }
        if self.role_cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidRoleCacheTtl);
        }
        Ok(())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window(),
            role_cache_ttl_secs: default_role_cache_ttl(),
        }
    }
}

fn default_rate_limit_max() -> u32 {
    60
}

fn default_rate_limit_window() -> u64 {
    60
}

fn default_role_cache_ttl() -> u64 {
    300
}
