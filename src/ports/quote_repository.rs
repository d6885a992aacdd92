//! Quote persistence port.
//!
//! The write operations here carry the authoritative copies of the
//! checks the application layer performs in advisory form. Status
//! updates and deletions are conditional writes keyed on the row's
//! *current* stored status; a mismatch is reported as an outcome value,
//! never resolved by overwriting.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Money, QuoteId, UserId};
use crate::domain::quote::{Quote, QuoteStatus};

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusWrite {
    /// The row matched the expected status and was updated.
    Applied,
    /// The row's stored status no longer matches what the caller read.
    /// Carries the status found at write time so the caller can surface
    /// the server-computed reason.
    Conflict { current: QuoteStatus },
    /// No row with that id.
    NotFound,
}

/// Outcome of a conditional delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteWrite {
    Deleted,
    /// The quote is no longer in a deletable status.
    Blocked { current: QuoteStatus },
    NotFound,
}

/// Port for quote storage.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Persists a new quote.
    async fn insert(&self, quote: &Quote) -> Result<(), DomainError>;

    /// Loads a quote by id.
    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>, DomainError>;

    /// Lists quotes, optionally scoped to one vendor.
    async fn list(&self, vendor_id: Option<&UserId>) -> Result<Vec<Quote>, DomainError>;

    /// Conditionally moves a quote from `expected_from` to `to`.
    ///
    /// Implementations must perform this as a single atomic conditional
    /// write ("update where id = ? and status = expected_from"), not a
    /// read followed by a write.
    async fn update_status(
        &self,
        id: QuoteId,
        expected_from: QuoteStatus,
        to: QuoteStatus,
    ) -> Result<StatusWrite, DomainError>;

    /// Updates the quote's total amount.
    async fn update_total(&self, id: QuoteId, new_total: Money) -> Result<(), DomainError>;

    /// Deletes a quote, but only while its stored status is still
    /// draft or pending.
    async fn delete(&self, id: QuoteId) -> Result<DeleteWrite, DomainError>;
}
