//! PostgreSQL adapters backed by sqlx.

mod api_key_repository;
mod audit_store;
mod payment_repository;
mod profile_reader;
mod quote_repository;

pub use api_key_repository::PostgresApiKeyRepository;
pub use audit_store::{PostgresAuditStore, PostgresCriticalAuditStore};
pub use payment_repository::PostgresPaymentRepository;
pub use profile_reader::PostgresProfileReader;
pub use quote_repository::PostgresQuoteRepository;
