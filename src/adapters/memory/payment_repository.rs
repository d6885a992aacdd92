//! In-memory payment repository for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Money, PaymentId, QuoteId};
use crate::domain::payment::PartialPayment;
use crate::ports::{CancelWrite, PaymentInsert, PaymentRepository, QuoteRepository};

/// In-memory implementation of [`PaymentRepository`].
///
/// Registration holds the payments write lock across the whole
/// balance-check-and-insert sequence, which gives the same "no two
/// concurrent registrations jointly overshoot" guarantee the Postgres
/// adapter gets from its transaction.
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<PaymentId, PartialPayment>>>,
    quotes: Arc<dyn QuoteRepository>,
}

impl InMemoryPaymentRepository {
    /// Creates a repository reading quote totals through the given
    /// quote repository.
    pub fn new(quotes: Arc<dyn QuoteRepository>) -> Self {
        Self {
            payments: Arc::new(RwLock::new(HashMap::new())),
            quotes,
        }
    }

    fn balance_locked(
        payments: &HashMap<PaymentId, PartialPayment>,
        quote_id: QuoteId,
        total: Money,
    ) -> Money {
        let paid: Money = payments
            .values()
            .filter(|p| p.quote_id == quote_id)
            .map(|p| p.effective_amount())
            .sum();
        total - paid
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn register(&self, payment: &PartialPayment) -> Result<PaymentInsert, DomainError> {
        // Write lock first so concurrent registrations serialize around
        // the balance computation.
        let mut payments = self.payments.write().await;

        let quote = match self.quotes.find_by_id(payment.quote_id).await? {
            Some(quote) => quote,
            None => return Ok(PaymentInsert::QuoteNotFound),
        };

        let balance = Self::balance_locked(&payments, payment.quote_id, quote.total_amount);
        if payment.amount > balance {
            return Ok(PaymentInsert::BalanceExceeded { balance });
        }

        payments.insert(payment.id, payment.clone());
        Ok(PaymentInsert::Inserted {
            remaining_balance: balance - payment.amount,
        })
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PartialPayment>, DomainError> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn cancel(
        &self,
        id: PaymentId,
        reason: Option<String>,
    ) -> Result<CancelWrite, DomainError> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&id) {
            None => Ok(CancelWrite::NotFound),
            Some(payment) if payment.is_cancelled => Ok(CancelWrite::AlreadyCancelled),
            Some(payment) => {
                payment.is_cancelled = true;
                payment.cancellation_reason = reason;
                Ok(CancelWrite::Cancelled)
            }
        }
    }

    async fn list_for_quote(&self, quote_id: QuoteId) -> Result<Vec<PartialPayment>, DomainError> {
        let payments = self.payments.read().await;
        let mut result: Vec<PartialPayment> = payments
            .values()
            .filter(|p| p.quote_id == quote_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| p.created_at);
        Ok(result)
    }

    async fn list_for_quotes(
        &self,
        quote_ids: &[QuoteId],
    ) -> Result<Vec<PartialPayment>, DomainError> {
        let payments = self.payments.read().await;
        let mut result: Vec<PartialPayment> = payments
            .values()
            .filter(|p| quote_ids.contains(&p.quote_id))
            .cloned()
            .collect();
        result.sort_by_key(|p| p.created_at);
        Ok(result)
    }
}
