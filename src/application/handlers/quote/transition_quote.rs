//! TransitionQuoteHandler - moves a quote along the status graph.
//!
//! The advisory table check runs first so obviously invalid requests
//! never reach the store; the store then re-checks by updating only
//! where the row still holds the expected status. A zero-row update is
//! surfaced as a conflict carrying the server-side current status, so
//! the caller can revert optimistic state instead of guessing.

use std::sync::Arc;

use serde_json::json;

use crate::application::access_control::AccessControl;
use crate::application::audit::{AuditLogger, CriticalAuditLogger};
use crate::domain::audit::{AuditAction, AuditLogEntry, RequestContext};
use crate::domain::foundation::{DomainError, ErrorCode, QuoteId, Timestamp, UserId};
use crate::domain::quote::{Quote, QuoteStatus};
use crate::ports::{QuoteRepository, StatusWrite};

/// Command to transition a quote to a new status.
#[derive(Debug, Clone)]
pub struct TransitionQuoteCommand {
    pub quote_id: QuoteId,
    pub to: QuoteStatus,
    /// Mandatory when the quote is in a protected state.
    pub reason: Option<String>,
    pub actor: UserId,
    pub context: RequestContext,
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct TransitionQuoteResult {
    pub quote: Quote,
}

/// Handler for quote status transitions.
pub struct TransitionQuoteHandler {
    quotes: Arc<dyn QuoteRepository>,
    access_control: Arc<AccessControl>,
    audit: Arc<AuditLogger>,
    critical_audit: Arc<CriticalAuditLogger>,
}

impl TransitionQuoteHandler {
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
        cmd: TransitionQuoteCommand,
    ) -> Result<TransitionQuoteResult, DomainError> {
        let quote = self
            .quotes
            .find_by_id(cmd.quote_id)
            .await?
            .ok_or_else(|| quote_not_found(cmd.quote_id))?;

        let role = self.access_control.resolve_role(&cmd.actor).await;
        quote.check_managed_by(&cmd.actor, role)?;

        quote
            .status
            .check_transition(cmd.to, role.is_admin())
            .into_result()?;

        // Same-state transition is a valid no-op; nothing to write.
        if cmd.to == quote.status {
            return Ok(TransitionQuoteResult { quote });
        }

        // Status changes on a confirmed quote are critical: the justifying
        // entry must exist before the mutation does.
        if quote.status == QuoteStatus::Confirmed {
            let reason = cmd.reason.as_deref().unwrap_or_default();
            self.critical_audit
                .log_quote_status_change(
                    &cmd.actor,
                    quote.id,
                    quote.status,
                    cmd.to,
                    reason,
                    &cmd.context,
                )
                .await?;
        }

        match self.quotes.update_status(quote.id, quote.status, cmd.to).await? {
            StatusWrite::Applied => {}
            StatusWrite::Conflict { current } => {
                let targets: Vec<&str> = current
                    .valid_transitions(role.is_admin())
                    .iter()
                    .map(|s| s.as_str())
                    .collect();
                return Err(DomainError::new(
                    ErrorCode::StatusConflict,
                    format!("Quote status is now {}, not {}", current, quote.status),
                )
                .with_detail("current_status", current.as_str())
                .with_detail("valid_targets", targets.join(", ")));
            }
            StatusWrite::NotFound => return Err(quote_not_found(cmd.quote_id)),
        }

        self.audit
            .create_audit_log(
                AuditLogEntry::new(cmd.actor.clone(), AuditAction::Update, "quotes")
                    .with_record_id(quote.id.to_string())
                    .with_old_values(json!({ "status": quote.status }))
                    .with_new_values(json!({ "status": cmd.to }))
                    .with_context(&cmd.context),
            )
            .await;

        let mut updated = quote;
        updated.status = cmd.to;
        updated.updated_at = Timestamp::now();
        Ok(TransitionQuoteResult { quote: updated })
    }
}

pub(crate) fn quote_not_found(id: QuoteId) -> DomainError {
    DomainError::new(ErrorCode::QuoteNotFound, "Quote not found")
        .with_detail("quote_id", id.to_string())
}
