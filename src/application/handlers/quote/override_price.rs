//! OverridePriceHandler - admin price change on a protected quote.
//!
//! Authorization runs before any audit write: a rejected override must
//! leave both audit stores untouched.

use std::sync::Arc;

use serde_json::json;

use crate::application::access_control::AccessControl;
use crate::application::audit::{AuditLogger, CriticalAuditLogger};
use crate::domain::audit::{changed_fields, AuditAction, AuditLogEntry, RequestContext};
use crate::domain::foundation::{
    DomainError, Money, QuoteId, Timestamp, UserId, ValidationError,
};
use crate::domain::quote::Quote;
use crate::ports::QuoteRepository;

use super::transition_quote::quote_not_found;

/// Command to override a quote's total price.
#[derive(Debug, Clone)]
pub struct OverridePriceCommand {
    pub quote_id: QuoteId,
    pub new_total: Money,
    /// Mandatory justification; recorded in the critical trail.
    pub reason: String,
    pub actor: UserId,
    pub context: RequestContext,
}

/// Result of a successful price override.
#[derive(Debug, Clone)]
pub struct OverridePriceResult {
    pub quote: Quote,
    pub old_total: Money,
}

/// Handler for admin price overrides.
pub struct OverridePriceHandler {
    quotes: Arc<dyn QuoteRepository>,
    access_control: Arc<AccessControl>,
    audit: Arc<AuditLogger>,
    critical_audit: Arc<CriticalAuditLogger>,
}

impl OverridePriceHandler {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        access_control: Arc<AccessControl>,
        audit: Arc<AuditLogger>,
        critical_audit: Arc<CriticalAuditLogger>,
    ) -> Self {
        Self {
            quotes,
            access_control,
            audit,
            critical_audit,
        }
    }

    pub async fn handle(
        &self,
        cmd: OverridePriceCommand,
    ) -> Result<OverridePriceResult, DomainError> {
        if cmd.new_total.is_negative() {
            return Err(ValidationError::negative("new_total", cmd.new_total).into());
        }

        self.access_control.require_admin(&cmd.actor).await?;

        let quote = self
            .quotes
            .find_by_id(cmd.quote_id)
            .await?
            .ok_or_else(|| quote_not_found(cmd.quote_id))?;

        let old_total = quote.total_amount;
        if cmd.new_total == old_total {
            return Ok(OverridePriceResult { quote, old_total });
        }

        // Critical entry precedes the write on protected-state quotes.
        if quote.is_price_protected() {
            self.critical_audit
                .log_price_override(
                    &cmd.actor,
                    quote.id,
                    json!(old_total),
                    json!(cmd.new_total),
                    &cmd.reason,
                    &cmd.context,
                )
                .await?;
        }

        self.quotes.update_total(quote.id, cmd.new_total).await?;

        let old_values = json!({ "total_amount": old_total });
        let new_values = json!({ "total_amount": cmd.new_total });
        let changes = changed_fields(&old_values, &new_values);
        let mut entry = AuditLogEntry::new(cmd.actor.clone(), AuditAction::Update, "quotes")
            .with_record_id(quote.id.to_string())
            .with_old_values(old_values)
            .with_new_values(new_values)
            .with_context(&cmd.context);
        entry.metadata = Some(json!({ "changed_fields": changes }));
        self.audit.create_audit_log(entry).await;

        let mut updated = quote;
        updated.total_amount = cmd.new_total;
        updated.updated_at = Timestamp::now();
        Ok(OverridePriceResult {
            quote: updated,
            old_total,
        })
    }
}
