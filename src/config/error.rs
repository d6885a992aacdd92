//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Rate limit must allow at least one request")]
    InvalidRateLimit,

    #[error("Rate limit window must be non-zero")]
    InvalidRateLimitWindow,

    #[error("Role cache TTL must be non-zero")]
    InvalidRoleCacheTtl,

    #[error("Commission rate must be between 0 and 1")]
    InvalidCommissionRate,

    #[error("Upcoming payment window must be at least one day")]
    InvalidUpcomingWindow,
}
