//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! The repository ports carry the authoritative copies of checks that
//! the application layer also performs in advisory form: conditional
//! status writes, balance-checked payment inserts, and single-shot
//! cancellation flips.

mod api_key_repository;
mod audit_store;
mod payment_repository;
mod profile_reader;
mod quote_repository;
mod rate_limiter;
mod role_cache;

pub use api_key_repository::ApiKeyRepository;
pub use audit_store::{AuditLogFilter, AuditStore, CriticalAuditStore};
pub use payment_repository::{CancelWrite, PaymentInsert, PaymentRepository};
pub use profile_reader::ProfileReader;
pub use quote_repository::{DeleteWrite, QuoteRepository, StatusWrite};
pub use rate_limiter::{RateLimitDecision, RateLimitKey, RateLimiter};
pub use role_cache::RoleCache;
