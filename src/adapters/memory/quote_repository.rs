//! In-memory quote repository for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Money, QuoteId, Timestamp, UserId};
use crate::domain::quote::{Quote, QuoteStatus};
use crate::ports::{DeleteWrite, QuoteRepository, StatusWrite};

/// In-memory implementation of [`QuoteRepository`].
///
/// The whole map sits behind one `RwLock`, so the conditional writes are
/// trivially atomic: the status comparison and the update happen under a
/// single write guard.
#[derive(Debug, Default)]
pub struct InMemoryQuoteRepository {
    quotes: Arc<RwLock<HashMap<QuoteId, Quote>>>,
}

impl InMemoryQuoteRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert(&self, quote: &Quote) -> Result<(), DomainError> {
        let mut quotes = self.quotes.write().await;
        quotes.insert(quote.id, quote.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>, DomainError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.get(&id).cloned())
    }

    async fn list(&self, vendor_id: Option<&UserId>) -> Result<Vec<Quote>, DomainError> {
        let quotes = self.quotes.read().await;
        let mut result: Vec<Quote> = quotes
            .values()
            .filter(|q| vendor_id.map_or(true, |v| q.is_owned_by(v)))
            .cloned()
            .collect();
        result.sort_by_key(|q| q.created_at);
        Ok(result)
    }

    async fn update_status(
        &self,
        id: QuoteId,
        expected_from: QuoteStatus,
        to: QuoteStatus,
    ) -> Result<StatusWrite, DomainError> {
        let mut quotes = self.quotes.write().await;
        match quotes.get_mut(&id) {
            None => Ok(StatusWrite::NotFound),
            Some(quote) if quote.status == expected_from => {
                quote.status = to;
                quote.updated_at = Timestamp::now();
                Ok(StatusWrite::Applied)
            }
            Some(quote) => Ok(StatusWrite::Conflict {
                current: quote.status,
            }),
        }
    }

    async fn update_total(&self, id: QuoteId, new_total: Money) -> Result<(), DomainError> {
        let mut quotes = self.quotes.write().await;
        match quotes.get_mut(&id) {
            None => Err(DomainError::new(
                crate::domain::foundation::ErrorCode::QuoteNotFound,
                "Quote not found",
            )
            .with_detail("quote_id", id.to_string())),
            Some(quote) => {
                quote.total_amount = new_total;
                quote.updated_at = Timestamp::now();
                Ok(())
            }
        }
    }

    async fn delete(&self, id: QuoteId) -> Result<DeleteWrite, DomainError> {
        let mut quotes = self.quotes.write().await;
        match quotes.get(&id) {
            None => Ok(DeleteWrite::NotFound),
            Some(quote) if quote.is_deletable() => {
                quotes.remove(&id);
                Ok(DeleteWrite::Deleted)
            }
            Some(quote) => Ok(DeleteWrite::Blocked {
                current: quote.status,
            }),
        }
    }
}
