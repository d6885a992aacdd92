//! Payment persistence port.
//!
//! Registration is a single atomic operation at the store boundary:
//! recompute the remaining balance from non-cancelled payments and
//! insert, inside one transaction, so two concurrent registrations can
//! never jointly overshoot the quote total.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Money, PaymentId, QuoteId};
use crate::domain::payment::PartialPayment;

/// Outcome of an atomic balance-checked insert.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentInsert {
    /// Payment recorded; carries the balance remaining after it.
    Inserted { remaining_balance: Money },
    /// The amount would have driven the balance below zero. Carries the
    /// balance computed inside the transaction.
    BalanceExceeded { balance: Money },
    /// The referenced quote does not exist.
    QuoteNotFound,
}

/// Outcome of a cancellation write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelWrite {
    Cancelled,
    /// The flag was already set. This is a conflict, not a no-op.
    AlreadyCancelled,
    NotFound,
}

/// Port for partial payment storage.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Atomically verifies the balance and inserts the payment.
    async fn register(&self, payment: &PartialPayment) -> Result<PaymentInsert, DomainError>;

    /// Loads a payment by id.
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PartialPayment>, DomainError>;

    /// Flips the cancellation flag exactly once.
    async fn cancel(
        &self,
        id: PaymentId,
        reason: Option<String>,
    ) -> Result<CancelWrite, DomainError>;

    /// All payments for one quote, cancelled ones included.
    async fn list_for_quote(&self, quote_id: QuoteId) -> Result<Vec<PartialPayment>, DomainError>;

    /// All payments for a set of quotes, for report building.
    async fn list_for_quotes(
        &self,
        quote_ids: &[QuoteId],
    ) -> Result<Vec<PartialPayment>, DomainError>;
}
