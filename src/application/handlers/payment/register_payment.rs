//! RegisterPaymentHandler - records an installment against a quote.
//!
//! The balance check and the insert happen in one atomic store
//! operation; the handler never computes the balance from its own read.

use std::sync::Arc;

use serde_json::json;

use crate::application::access_control::AccessControl;
use crate::application::audit::AuditLogger;
use crate::domain::audit::{AuditAction, AuditLogEntry, RequestContext};
use crate::domain::foundation::{
    DomainError, ErrorCode, Money, PaymentId, QuoteId, Timestamp, UserId,
};
use crate::domain::payment::{PartialPayment, PaymentMethod};
use crate::ports::{PaymentInsert, PaymentRepository, QuoteRepository};

/// Command to register a partial payment.
#[derive(Debug, Clone)]
pub struct RegisterPaymentCommand {
    pub quote_id: QuoteId,
    pub amount: Money,
    pub payment_date: Timestamp,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub actor: UserId,
    pub context: RequestContext,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterPaymentResult {
    pub payment_id: PaymentId,
    pub remaining_balance: Money,
}

/// Handler for payment registration.
pub struct RegisterPaymentHandler {
    quotes: Arc<dyn QuoteRepository>,
    payments: Arc<dyn PaymentRepository>,
    access_control: Arc<AccessControl>,
    audit: Arc<AuditLogger>,
}

impl RegisterPaymentHandler {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        payments: Arc<dyn PaymentRepository>,
        access_control: Arc<AccessControl>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            quotes,
            payments,
            access_control,
            audit,
        }
    }

    pub async fn handle(
        &self,
        cmd: RegisterPaymentCommand,
    ) -> Result<RegisterPaymentResult, DomainError> {
        let quote = self
            .quotes
            .find_by_id(cmd.quote_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::QuoteNotFound, "Quote not found")
                    .with_detail("quote_id", cmd.quote_id.to_string())
            })?;

        let role = self.access_control.resolve_role(&cmd.actor).await;
        quote.check_managed_by(&cmd.actor, role)?;

        let payment = PartialPayment::new(
            cmd.quote_id,
            cmd.amount,
            cmd.payment_date,
            cmd.payment_method,
            cmd.reference_number,
            cmd.notes,
            cmd.actor.clone(),
        )?;

        let remaining_balance = match self.payments.register(&payment).await? {
            PaymentInsert::Inserted { remaining_balance } => remaining_balance,
            PaymentInsert::BalanceExceeded { balance } => {
                return Err(DomainError::new(
                    ErrorCode::BalanceExceeded,
                    format!(
                        "Payment of {} exceeds the remaining balance of {}",
                        cmd.amount, balance
                    ),
                )
                .with_detail("balance", balance.to_string())
                .with_detail("amount", cmd.amount.to_string()));
            }
            PaymentInsert::QuoteNotFound => {
                return Err(
                    DomainError::new(ErrorCode::QuoteNotFound, "Quote not found")
                        .with_detail("quote_id", cmd.quote_id.to_string()),
                );
            }
        };

        self.audit
            .create_audit_log(
                AuditLogEntry::new(cmd.actor, AuditAction::Create, "partial_payments")
                    .with_record_id(payment.id.to_string())
                    .with_new_values(json!({
                        "quote_id": payment.quote_id,
                        "amount": payment.amount,
                        "payment_method": payment.payment_method,
                    }))
                    .with_context(&cmd.context),
            )
            .await;

        Ok(RegisterPaymentResult {
            payment_id: payment.id,
            remaining_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAuditStore, InMemoryPaymentRepository, InMemoryProfileReader,
        InMemoryQuoteRepository, InMemoryRoleCache,
    };
    use crate::application::access_control::DEFAULT_ROLE_CACHE_TTL;
    use crate::domain::foundation::ClientId;
    use crate::domain::quote::{Quote, QuoteStatus};

    struct Fixture {
        handler: RegisterPaymentHandler,
        quotes: Arc<InMemoryQuoteRepository>,
        audit_store: Arc<InMemoryAuditStore>,
    }

    async fn fixture() -> Fixture {
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new(quotes.clone()));
        let audit_store = Arc::new(InMemoryAuditStore::new());
        let profiles = Arc::new(InMemoryProfileReader::new());
        profiles.set_role(&vendor(), "vendor").await;

        let access_control = Arc::new(AccessControl::new(
            profiles,
            Arc::new(InMemoryRoleCache::new()),
            DEFAULT_ROLE_CACHE_TTL,
        ));
        let handler = RegisterPaymentHandler::new(
            quotes.clone(),
            payments,
            access_control,
            Arc::new(AuditLogger::new(audit_store.clone())),
        );
        Fixture {
            handler,
            quotes,
            audit_store,
        }
    }

    fn vendor() -> UserId {
        UserId::new("vendor-1").unwrap()
    }

    async fn seed_quote(f: &Fixture, total: i64) -> Quote {
        let mut quote = Quote::new(
            ClientId::new(),
            "Acme Weddings",
            vendor(),
            Money::from_units(total),
            Money::from_units(0),
            Timestamp::now().add_days(30),
        )
        .unwrap();
        quote.status = QuoteStatus::Confirmed;
        f.quotes.insert(&quote).await.unwrap();
        quote
    }

    fn cmd(quote: &Quote, amount: i64) -> RegisterPaymentCommand {
        RegisterPaymentCommand {
            quote_id: quote.id,
            amount: Money::from_units(amount),
            payment_date: Timestamp::now(),
            payment_method: PaymentMethod::Transfer,
            reference_number: None,
            notes: None,
            actor: vendor(),
            context: RequestContext::empty(),
        }
    }

    #[tokio::test]
    async fn payment_reduces_the_balance() {
        let f = fixture().await;
        let quote = seed_quote(&f, 1000).await;

        let result = f.handler.handle(cmd(&quote, 400)).await.unwrap();
        assert_eq!(result.remaining_balance, Money::from_units(600));
        assert_eq!(f.audit_store.len().await, 1);
    }

    #[tokio::test]
    async fn overshooting_payment_is_rejected_with_the_server_balance() {
        let f = fixture().await;
        let quote = seed_quote(&f, 1000).await;
        f.handler.handle(cmd(&quote, 400)).await.unwrap();

        let err = f.handler.handle(cmd(&quote, 700)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BalanceExceeded);
        assert_eq!(err.details.get("balance"), Some(&"600".to_string()));
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let f = fixture().await;
        let quote = seed_quote(&f, 1000).await;

        let err = f.handler.handle(cmd(&quote, 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfRange);
    }

    #[tokio::test]
    async fn foreign_vendor_cannot_register_payments() {
        let f = fixture().await;
        let quote = seed_quote(&f, 1000).await;

        let mut command = cmd(&quote, 100);
        command.actor = UserId::new("vendor-2").unwrap();
        let err = f.handler.handle(command).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn missing_quote_is_not_found() {
        let f = fixture().await;
        let command = RegisterPaymentCommand {
            quote_id: QuoteId::new(),
            amount: Money::from_units(10),
            payment_date: Timestamp::now(),
            payment_method: PaymentMethod::Cash,
            reference_number: None,
            notes: None,
            actor: vendor(),
            context: RequestContext::empty(),
        };
        let err = f.handler.handle(command).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::QuoteNotFound);
    }
}
