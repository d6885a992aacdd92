//! Application layer - services and handlers orchestrating the ports.

pub mod access_control;
pub mod api_keys;
pub mod audit;
pub mod handlers;

pub use access_control::AccessControl;
pub use api_keys::{ApiKeyService, CreatedApiKey};
pub use audit::{AuditLogger, AuditOutcome, CriticalAuditLogger};
