//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `QUOTEDESK` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use quotedesk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod finance;
mod security;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use finance::FinanceConfig;
pub use security::SecurityConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Security configuration (rate limits, role cache)
    #[serde(default)]
    pub security: SecurityConfig,

    /// Finance configuration (commission rate, report windows)
    #[serde(default)]
    pub finance: FinanceConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads environment variables with
    /// the `QUOTEDESK` prefix, e.g.
    /// `QUOTEDESK__DATABASE__URL=postgresql://...` or
    /// `QUOTEDESK__FINANCE__COMMISSION_RATE=0.12`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("QUOTEDESK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.security.validate()?;
        self.finance.validate()?;
        Ok(())
    }
}
