//! CancelPaymentHandler - soft-cancels a payment, restoring its amount
//! to the quote balance.
//!
//! Cancellation is a single flip: a second cancel is a conflict so a
//! double-submitted correction cannot silently pass.

use std::sync::Arc;

use serde_json::json;

use crate::application::access_control::AccessControl;
use crate::application::audit::AuditLogger;
use crate::domain::audit::{AuditAction, AuditLogEntry, RequestContext};
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, UserId};
use crate::ports::{CancelWrite, PaymentRepository, QuoteRepository};

/// Command to cancel a registered payment.
#[derive(Debug, Clone)]
pub struct CancelPaymentCommand {
    pub payment_id: PaymentId,
    pub reason: Option<String>,
    pub actor: UserId,
    pub context: RequestContext,
}

/// Handler for payment cancellation.
pub struct CancelPaymentHandler {
    quotes: Arc<dyn QuoteRepository>,
    payments: Arc<dyn PaymentRepository>,
    access_control: Arc<AccessControl>,
    audit: Arc<AuditLogger>,
}

impl CancelPaymentHandler {
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

    pub async fn handle(&self, cmd: CancelPaymentCommand) -> Result<(), DomainError> {
        let payment = self
            .payments
            .find_by_id(cmd.payment_id)
            .await?
            .ok_or_else(|| payment_not_found(cmd.payment_id))?;

        // Authorization mirrors registration: admin or the owning vendor
        // of the quote the payment belongs to.
        let quote = self
            .quotes
            .find_by_id(payment.quote_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::QuoteNotFound, "Quote not found")
                    .with_detail("quote_id", payment.quote_id.to_string())
            })?;
        let role = self.access_control.resolve_role(&cmd.actor).await;
        quote.check_managed_by(&cmd.actor, role)?;

        match self.payments.cancel(cmd.payment_id, cmd.reason.clone()).await? {
            CancelWrite::Cancelled => {}
            CancelWrite::AlreadyCancelled => {
                return Err(DomainError::new(
                    ErrorCode::PaymentAlreadyCancelled,
                    "Payment is already cancelled",
                )
                .with_detail("payment_id", cmd.payment_id.to_string()));
            }
            CancelWrite::NotFound => return Err(payment_not_found(cmd.payment_id)),
        }

        self.audit
            .create_audit_log(
                AuditLogEntry::new(cmd.actor.clone(), AuditAction::Update, "partial_payments")
                    .with_record_id(cmd.payment_id.to_string())
                    .with_old_values(json!({ "is_cancelled": false }))
                    .with_new_values(json!({
                        "is_cancelled": true,
                        "cancellation_reason": cmd.reason,
                    }))
                    .with_context(&cmd.context),
            )
            .await;

        Ok(())
    }
}

fn payment_not_found(id: PaymentId) -> DomainError {
    DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
        .with_detail("payment_id", id.to_string())
}
