//! QuoteDesk - Quote Lifecycle & Financial Integrity Engine
//!
//! This crate manages the full lifecycle of client quotes: a validated
//! status state machine, a tamper-evident audit trail, a partial-payment
//! ledger with atomic balance reconciliation, and financial reporting,
//! guarded by role-based access control, API keys, and rate limiting.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
