//! Command and query handlers, grouped by bounded context.

pub mod payment;
pub mod quote;
pub mod report;
