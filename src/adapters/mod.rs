//! Adapter implementations of the ports.

pub mod memory;
pub mod postgres;
pub mod rate_limiter;
