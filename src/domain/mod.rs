//! Domain layer - pure business types and logic, no I/O.

pub mod api_key;
pub mod audit;
pub mod foundation;
pub mod payment;
pub mod quote;
