//! DeleteQuoteHandler - admin-only physical deletion of draft/pending
//! quotes.
//!
//! Confirmed and cancelled quotes are financial record and are never
//! deleted. The deletion snapshot goes to the critical trail before the
//! row disappears, so the record stays reconstructable.

use std::sync::Arc;

use crate::application::access_control::AccessControl;
use crate::application::audit::{AuditLogger, CriticalAuditLogger};
use crate::domain::audit::{AuditAction, AuditLogEntry, RequestContext};
use crate::domain::foundation::{DomainError, ErrorCode, QuoteId, UserId};
use crate::ports::{DeleteWrite, QuoteRepository};

use super::transition_quote::quote_not_found;

/// Command to delete a quote.
#[derive(Debug, Clone)]
pub struct DeleteQuoteCommand {
    pub quote_id: QuoteId,
    /// Mandatory justification; recorded in the critical trail.
    pub reason: String,
    pub actor: UserId,
    pub context: RequestContext,
}

/// Handler for quote deletion.
pub struct DeleteQuoteHandler {
    quotes: Arc<dyn QuoteRepository>,
    access_control: Arc<AccessControl>,
    audit: Arc<AuditLogger>,
    critical_audit: Arc<CriticalAuditLogger>,
}

impl DeleteQuoteHandler {
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

    pub async fn handle(&self, cmd: DeleteQuoteCommand) -> Result<(), DomainError> {
        let quote = self
            .quotes
            .find_by_id(cmd.quote_id)
            .await?
            .ok_or_else(|| quote_not_found(cmd.quote_id))?;

        let role = self.access_control.resolve_role(&cmd.actor).await;
        quote.check_deletable_by(role)?;

        let snapshot = quote.snapshot();
        self.critical_audit
            .log_quote_delete(&cmd.actor, quote.id, snapshot.clone(), &cmd.reason, &cmd.context)
            .await?;

        match self.quotes.delete(quote.id).await? {
            DeleteWrite::Deleted => {}
            DeleteWrite::Blocked { current } => {
                // Status moved to a protected state between read and write.
                return Err(DomainError::new(
                    ErrorCode::StatusConflict,
                    format!("Quote became {} and can no longer be deleted", current),
                )
                .with_detail("current_status", current.as_str()));
            }
            DeleteWrite::NotFound => return Err(quote_not_found(cmd.quote_id)),
        }

        self.audit
            .create_audit_log(
                AuditLogEntry::new(cmd.actor.clone(), AuditAction::Delete, "quotes")
                    .with_record_id(quote.id.to_string())
                    .with_old_values(snapshot)
                    .with_context(&cmd.context),
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAuditStore, InMemoryCriticalAuditStore, InMemoryProfileReader,
        InMemoryQuoteRepository, InMemoryRoleCache,
    };
    use crate::application::access_control::DEFAULT_ROLE_CACHE_TTL;
    use crate::domain::foundation::{ClientId, Money, Timestamp};
    use crate::ports::CriticalAuditStore;
    use crate::domain::quote::{Quote, QuoteStatus};

    struct Fixture {
        handler: DeleteQuoteHandler,
        quotes: Arc<InMemoryQuoteRepository>,
        critical_store: Arc<InMemoryCriticalAuditStore>,
    }

    async fn fixture() -> Fixture {
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let audit_store = Arc::new(InMemoryAuditStore::new());
        let critical_store = Arc::new(InMemoryCriticalAuditStore::new());
        let profiles = Arc::new(InMemoryProfileReader::new());
        profiles.set_role(&vendor(), "vendor").await;
        profiles.set_role(&admin(), "admin").await;

        let access_control = Arc::new(AccessControl::new(
            profiles,
            Arc::new(InMemoryRoleCache::new()),
            DEFAULT_ROLE_CACHE_TTL,
        ));
        let handler = DeleteQuoteHandler::new(
            quotes.clone(),
            access_control,
            Arc::new(AuditLogger::new(audit_store)),
            Arc::new(CriticalAuditLogger::new(critical_store.clone())),
        );
        Fixture {
            handler,
            quotes,
            critical_store,
        }
    }

    fn vendor() -> UserId {
        UserId::new("vendor-1").unwrap()
    }

    fn admin() -> UserId {
        UserId::new("admin-1").unwrap()
    }

    async fn seed_quote(f: &Fixture, status: QuoteStatus) -> Quote {
        let mut quote = Quote::new(
            ClientId::new(),
            "Acme Weddings",
            vendor(),
            Money::from_units(1000),
            Money::from_units(600),
            Timestamp::now().add_days(30),
        )
        .unwrap();
        quote.status = status;
        f.quotes.insert(&quote).await.unwrap();
        quote
    }

    fn cmd(quote: &Quote, actor: UserId) -> DeleteQuoteCommand {
        DeleteQuoteCommand {
            quote_id: quote.id,
            reason: "duplicate record".to_string(),
            actor,
            context: RequestContext::empty(),
        }
    }

    #[tokio::test]
    async fn admin_deletes_draft_quote_with_snapshot_trail() {
        let f = fixture().await;
        let quote = seed_quote(&f, QuoteStatus::Draft).await;

        f.handler.handle(cmd(&quote, admin())).await.unwrap();

        assert!(f.quotes.find_by_id(quote.id).await.unwrap().is_none());
        let trail = f
            .critical_store
            .list_for_record("quotes", &quote.id.to_string())
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].context["snapshot"]["client_name"], "Acme Weddings");
    }

    #[tokio::test]
    async fn vendor_cannot_delete_even_their_own_quote() {
        let f = fixture().await;
        let quote = seed_quote(&f, QuoteStatus::Draft).await;

        let err = f.handler.handle(cmd(&quote, vendor())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(f.quotes.find_by_id(quote.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn confirmed_quote_cannot_be_deleted() {
        let f = fixture().await;
        let quote = seed_quote(&f, QuoteStatus::Confirmed).await;

        let err = f.handler.handle(cmd(&quote, admin())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert!(f
            .critical_store
            .list_for_record("quotes", &quote.id.to_string())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn blank_reason_is_rejected_before_the_delete() {
        let f = fixture().await;
        let quote = seed_quote(&f, QuoteStatus::Draft).await;

        let mut command = cmd(&quote, admin());
        command.reason = String::new();
        let err = f.handler.handle(command).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
        assert!(f.quotes.find_by_id(quote.id).await.unwrap().is_some());
    }
}
