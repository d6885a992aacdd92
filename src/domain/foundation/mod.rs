//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the QuoteDesk domain.

mod errors;
mod ids;
mod money;
mod role;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ApiKeyId, AuditLogId, ClientId, PaymentId, QuoteId, UserId};
pub use money::Money;
pub use role::UserRole;
pub use timestamp::Timestamp;
