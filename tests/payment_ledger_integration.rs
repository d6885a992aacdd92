//! Integration tests for the payment ledger.
//!
//! These tests verify the end-to-end flow:
//! 1. Payment registration re-checks the remaining balance atomically
//! 2. Concurrent registrations cannot jointly exceed the quote total
//! 3. Cancelling a payment restores headroom for new payments
//! 4. Financial reports aggregate the ledger per actor scope
//!
//! Uses in-memory implementations to test the flow without external
//! dependencies.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use quotedesk::adapters::memory::{
    InMemoryAuditStore, InMemoryPaymentRepository, InMemoryProfileReader, InMemoryQuoteRepository,
    InMemoryRoleCache,
};
use quotedesk::application::handlers::payment::{
    CancelPaymentCommand, CancelPaymentHandler, RegisterPaymentCommand, RegisterPaymentHandler,
};
use quotedesk::application::handlers::report::FinancialReportHandler;
use quotedesk::application::{AccessControl, AuditLogger};
use quotedesk::domain::audit::RequestContext;
use quotedesk::domain::foundation::{ClientId, ErrorCode, Money, Timestamp, UserId};
use quotedesk::domain::payment::PaymentMethod;
use quotedesk::domain::quote::{Quote, QuoteStatus};
use quotedesk::ports::QuoteRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    quotes: Arc<InMemoryQuoteRepository>,
    profiles: Arc<InMemoryProfileReader>,
    register: Arc<RegisterPaymentHandler>,
    cancel: CancelPaymentHandler,
    reports: FinancialReportHandler,
}

impl TestApp {
    fn new() -> Self {
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new(quotes.clone()));
        let profiles = Arc::new(InMemoryProfileReader::new());

        let access_control = Arc::new(AccessControl::new(
            profiles.clone(),
            Arc::new(InMemoryRoleCache::new()),
            Duration::from_secs(300),
        ));
        let audit = Arc::new(AuditLogger::new(Arc::new(InMemoryAuditStore::new())));

        let register = Arc::new(RegisterPaymentHandler::new(
            quotes.clone(),
            payments.clone(),
            access_control.clone(),
            audit.clone(),
        ));
        let cancel = CancelPaymentHandler::new(
            quotes.clone(),
            payments.clone(),
            access_control.clone(),
            audit,
        );
        let reports = FinancialReportHandler::new(
            quotes.clone(),
            payments,
            access_control,
            Decimal::new(10, 2),
        );

        Self {
            quotes,
            profiles,
            register,
            cancel,
            reports,
        }
    }

    async fn seed_quote(&self, vendor: &UserId, status: QuoteStatus, total: i64) -> Quote {
        let mut quote = Quote::new(
            ClientId::new(),
            "Acme Corp",
            vendor.clone(),
            Money::from_units(total),
            Money::from_units(total / 2),
            Timestamp::now().add_days(30),
        )
        .unwrap();
        quote.status = status;
        self.quotes.insert(&quote).await.unwrap();
        quote
    }
}

fn vendor() -> UserId {
    UserId::new("vendor-1").unwrap()
}

fn payment_cmd(quote: &Quote, actor: &UserId, amount: i64) -> RegisterPaymentCommand {
    RegisterPaymentCommand {
        quote_id: quote.id,
        amount: Money::from_units(amount),
        payment_date: Timestamp::now(),
        payment_method: PaymentMethod::Transfer,
        reference_number: None,
        notes: None,
        actor: actor.clone(),
        context: RequestContext::empty(),
    }
}

// =============================================================================
// Balance reconciliation
// =============================================================================

#[tokio::test]
async fn overshooting_payment_is_rejected_with_current_balance() {
    let app = TestApp::new();
    let actor = vendor();
    let quote = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;

    let first = app
        .register
        .handle(payment_cmd(&quote, &actor, 400))
        .await
        .unwrap();
    assert_eq!(first.remaining_balance, Money::from_units(600));

    let err = app
        .register
        .handle(payment_cmd(&quote, &actor, 700))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BalanceExceeded);
    assert_eq!(err.details.get("balance").map(String::as_str), Some("600"));

    // The rejected payment left the ledger untouched.
    let report = app.reports.get_financial_report(&actor).await.unwrap();
    assert_eq!(report[0].amount_paid, Money::from_units(400));
}

#[tokio::test]
async fn exact_settlement_is_accepted() {
    let app = TestApp::new();
    let actor = vendor();
    let quote = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;

    app.register
        .handle(payment_cmd(&quote, &actor, 400))
        .await
        .unwrap();
    let second = app
        .register
        .handle(payment_cmd(&quote, &actor, 600))
        .await
        .unwrap();

    assert_eq!(second.remaining_balance, Money::ZERO);
}

#[tokio::test]
async fn concurrent_registrations_cannot_jointly_exceed_the_total() {
    let app = TestApp::new();
    let actor = vendor();
    let quote = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;

    let a = tokio::spawn({
        let register = app.register.clone();
        let cmd = payment_cmd(&quote, &actor, 700);
        async move { register.handle(cmd).await }
    });
    let b = tokio::spawn({
        let register = app.register.clone();
        let cmd = payment_cmd(&quote, &actor, 700);
        async move { register.handle(cmd).await }
    });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1, "exactly one of two 700s fits in 1000");

    let report = app.reports.get_financial_report(&actor).await.unwrap();
    assert_eq!(report[0].amount_paid, Money::from_units(700));
}

#[tokio::test]
async fn cancelled_payment_restores_headroom() {
    let app = TestApp::new();
    let actor = vendor();
    let quote = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;

    let first = app
        .register
        .handle(payment_cmd(&quote, &actor, 800))
        .await
        .unwrap();

    // 300 does not fit yet.
    let err = app
        .register
        .handle(payment_cmd(&quote, &actor, 300))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BalanceExceeded);

    app.cancel
        .handle(CancelPaymentCommand {
            payment_id: first.payment_id,
            reason: Some("bounced transfer".to_string()),
            actor: actor.clone(),
            context: RequestContext::empty(),
        })
        .await
        .unwrap();

    let retried = app
        .register
        .handle(payment_cmd(&quote, &actor, 300))
        .await
        .unwrap();
    assert_eq!(retried.remaining_balance, Money::from_units(700));
}

#[tokio::test]
async fn double_cancel_is_a_conflict() {
    let app = TestApp::new();
    let actor = vendor();
    let quote = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;
    let first = app
        .register
        .handle(payment_cmd(&quote, &actor, 100))
        .await
        .unwrap();

    let cancel_cmd = CancelPaymentCommand {
        payment_id: first.payment_id,
        reason: None,
        actor: actor.clone(),
        context: RequestContext::empty(),
    };
    app.cancel.handle(cancel_cmd.clone()).await.unwrap();
    let err = app.cancel.handle(cancel_cmd).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentAlreadyCancelled);
}

// =============================================================================
// Reporting
// =============================================================================

#[tokio::test]
async fn summary_aggregates_only_visible_quotes() {
    let app = TestApp::new();
    let actor = vendor();
    let other = UserId::new("vendor-2").unwrap();

    let mine = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;
    app.seed_quote(&other, QuoteStatus::Confirmed, 5000).await;
    app.register
        .handle(payment_cmd(&mine, &actor, 400))
        .await
        .unwrap();

    let summary = app.reports.calculate_financial_summary(&actor).await.unwrap();
    assert_eq!(summary.quote_count, 1);
    assert_eq!(summary.total_sales, Money::from_units(1000));
    assert_eq!(summary.total_collected, Money::from_units(400));
    assert_eq!(summary.total_commissions, Money::from_units(100));
}

#[tokio::test]
async fn admin_summary_spans_all_vendors() {
    let app = TestApp::new();
    let admin = UserId::new("admin-1").unwrap();
    app.profiles.set_role(&admin, "admin").await;

    app.seed_quote(&vendor(), QuoteStatus::Confirmed, 1000).await;
    app.seed_quote(&UserId::new("vendor-2").unwrap(), QuoteStatus::Confirmed, 5000)
        .await;

    let summary = app.reports.calculate_financial_summary(&admin).await.unwrap();
    assert_eq!(summary.quote_count, 2);
    assert_eq!(summary.total_sales, Money::from_units(6000));
}

#[tokio::test]
async fn settled_quotes_produce_no_payment_obligations() {
    let app = TestApp::new();
    let actor = vendor();
    let quote = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;
    app.register
        .handle(payment_cmd(&quote, &actor, 1000))
        .await
        .unwrap();

    let overdue = app.reports.get_overdue_payments(&actor).await.unwrap();
    let upcoming = app.reports.get_upcoming_payments(&actor, 60).await.unwrap();
    assert!(overdue.is_empty());
    assert!(upcoming.is_empty());
}

#[tokio::test]
async fn outstanding_balance_shows_up_as_upcoming_before_the_event() {
    let app = TestApp::new();
    let actor = vendor();
    let quote = app.seed_quote(&actor, QuoteStatus::Confirmed, 1000).await;
    app.register
        .handle(payment_cmd(&quote, &actor, 250))
        .await
        .unwrap();

    let upcoming = app.reports.get_upcoming_payments(&actor, 60).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].amount, Money::from_units(750));

    let overdue = app.reports.get_overdue_payments(&actor).await.unwrap();
    assert!(overdue.is_empty());
}
