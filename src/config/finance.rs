//! Finance configuration: commission rate and reporting windows.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::ValidationError;

/// Finance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceConfig {
    /// Commission as a decimal rate of revenue (0.10 = 10%)
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,

    /// Lookahead window for upcoming payment reports, in days
    #[serde(default = "default_upcoming_window_days")]
    pub upcoming_window_days: i64,
}

impl FinanceConfig {
    /// Validate finance configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate > Decimal::ONE {
            return Err(ValidationError::InvalidCommissionRate);
        }
        if self.upcoming_window_days < 1 {
            return Err(ValidationError::InvalidUpcomingWindow);
        }
        Ok(())
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            commission_rate: default_commission_rate(),
            upcoming_window_days: default_upcoming_window_days(),
        }
    }
}

fn default_commission_rate() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

fn default_upcoming_window_days() -> i64 {
    7
}
