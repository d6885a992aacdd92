//! In-memory adapters for tests and single-process deployments.
//!
//! Each adapter honors the same atomicity contracts as its Postgres
//! counterpart, using a single lock where Postgres uses a transaction.

mod api_key_repository;
mod audit_store;
mod payment_repository;
mod profile_reader;
mod quote_repository;
mod role_cache;

pub use api_key_repository::InMemoryApiKeyRepository;
pub use audit_store::{InMemoryAuditStore, InMemoryCriticalAuditStore};
pub use payment_repository::InMemoryPaymentRepository;
pub use profile_reader::InMemoryProfileReader;
pub use quote_repository::InMemoryQuoteRepository;
pub use role_cache::InMemoryRoleCache;
