//! FinancialReportHandler - read-side reporting over quotes and
//! payments.
//!
//! Admins see the whole portfolio; vendors see only their own quotes.
//! All arithmetic is delegated to the pure functions in
//! `domain::payment::report`.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::access_control::AccessControl;
use crate::domain::foundation::{DomainError, QuoteId, Timestamp, UserId};
use crate::domain::payment::{
    classify_overdue, classify_upcoming, summarize, FinancialSummary, OverduePayment,
    PartialPayment, QuoteFinancials, UpcomingPayment,
};
use crate::ports::{PaymentRepository, QuoteRepository};

/// Handler for financial reports, summaries, and obligation lists.
pub struct FinancialReportHandler {
    quotes: Arc<dyn QuoteRepository>,
    payments: Arc<dyn PaymentRepository>,
    access_control: Arc<AccessControl>,
    commission_rate: Decimal,
}

impl FinancialReportHandler {
    pub fn new(
        quotes: Arc<dyn QuoteRepository>,
        payments: Arc<dyn PaymentRepository>,
        access_control: Arc<AccessControl>,
        commission_rate: Decimal,
    ) -> Self {
        Self {
            quotes,
            payments,
            access_control,
            commission_rate,
        }
    }

    /// Per-quote financial figures visible to the actor.
    pub async fn get_financial_report(
        &self,
        actor: &UserId,
    ) -> Result<Vec<QuoteFinancials>, DomainError> {
        let scope = if self.access_control.check_admin(actor).await {
            None
        } else {
            Some(actor)
        };
        let quotes = self.quotes.list(scope).await?;

        let quote_ids: Vec<QuoteId> = quotes.iter().map(|q| q.id).collect();
        let mut by_quote: HashMap<QuoteId, Vec<PartialPayment>> = HashMap::new();
        for payment in self.payments.list_for_quotes(&quote_ids).await? {
            by_quote.entry(payment.quote_id).or_default().push(payment);
        }

        Ok(quotes
            .iter()
            .map(|quote| {
                let payments = by_quote.get(&quote.id).map(Vec::as_slice).unwrap_or(&[]);
                QuoteFinancials::compute(quote, payments, self.commission_rate)
            })
            .collect())
    }

    /// Portfolio-level roll-up for the actor's visible quotes.
    pub async fn calculate_financial_summary(
        &self,
        actor: &UserId,
    ) -> Result<FinancialSummary, DomainError> {
        let financials = self.get_financial_report(actor).await?;
        Ok(summarize(&financials))
    }

    /// Outstanding balances past their due date, most overdue first.
    pub async fn get_overdue_payments(
        &self,
        actor: &UserId,
    ) -> Result<Vec<OverduePayment>, DomainError> {
        let financials = self.get_financial_report(actor).await?;
        Ok(classify_overdue(&financials, Timestamp::now()))
    }

    /// Outstanding balances due within `window_days`, soonest first.
    pub async fn get_upcoming_payments(
        &self,
        actor: &UserId,
        window_days: i64,
    ) -> Result<Vec<UpcomingPayment>, DomainError> {
        let financials = self.get_financial_report(actor).await?;
        Ok(classify_upcoming(&financials, Timestamp::now(), window_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryPaymentRepository, InMemoryProfileReader, InMemoryQuoteRepository,
        InMemoryRoleCache,
    };
    use crate::application::access_control::DEFAULT_ROLE_CACHE_TTL;
    use crate::domain::foundation::{ClientId, Money};
    use crate::domain::payment::PaymentMethod;
    use crate::domain::quote::{Quote, QuoteStatus};

    struct Fixture {
        handler: FinancialReportHandler,
        quotes: Arc<InMemoryQuoteRepository>,
        payments: Arc<InMemoryPaymentRepository>,
    }

    async fn fixture() -> Fixture {
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new(quotes.clone()));
        let profiles = Arc::new(InMemoryProfileReader::new());
        profiles.set_role(&vendor("vendor-1"), "vendor").await;
        profiles.set_role(&vendor("vendor-2"), "vendor").await;
        profiles.set_role(&admin(), "admin").await;

        let access_control = Arc::new(AccessControl::new(
            profiles,
            Arc::new(InMemoryRoleCache::new()),
            DEFAULT_ROLE_CACHE_TTL,
        ));
        let handler = FinancialReportHandler::new(
            quotes.clone(),
            payments.clone(),
            access_control,
            "0.10".parse().unwrap(),
        );
        Fixture {
            handler,
            quotes,
            payments,
        }
    }

    fn vendor(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn admin() -> UserId {
        UserId::new("admin-1").unwrap()
    }

    async fn seed_quote(
        f: &Fixture,
        owner: &str,
        total: i64,
        cost: i64,
        status: QuoteStatus,
        due_in_days: i64,
    ) -> Quote {
        let mut quote = Quote::new(
            ClientId::new(),
            format!("client of {}", owner),
            vendor(owner),
            Money::from_units(total),
            Money::from_units(cost),
            Timestamp::now().add_days(due_in_days),
        )
        .unwrap();
        quote.status = status;
        f.quotes.insert(&quote).await.unwrap();
        quote
    }

    async fn pay(f: &Fixture, quote: &Quote, amount: i64) {
        let payment = PartialPayment::new(
            quote.id,
            Money::from_units(amount),
            Timestamp::now(),
            PaymentMethod::Transfer,
            None,
            None,
            quote.vendor_id.clone(),
        )
        .unwrap();
        f.payments.register(&payment).await.unwrap();
    }

    #[tokio::test]
    async fn vendor_report_is_scoped_to_their_quotes() {
        let f = fixture().await;
        seed_quote(&f, "vendor-1", 1000, 600, QuoteStatus::Confirmed, 10).await;
        seed_quote(&f, "vendor-2", 500, 300, QuoteStatus::Confirmed, 10).await;

        let report = f.handler.get_financial_report(&vendor("vendor-1")).await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].total_amount, Money::from_units(1000));

        let all = f.handler.get_financial_report(&admin()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn summary_aggregates_confirmed_and_pending_separately() {
        let f = fixture().await;
        let confirmed = seed_quote(&f, "vendor-1", 1000, 600, QuoteStatus::Confirmed, 10).await;
        seed_quote(&f, "vendor-1", 500, 300, QuoteStatus::Pending, 10).await;
        seed_quote(&f, "vendor-1", 900, 100, QuoteStatus::Cancelled, 10).await;
        pay(&f, &confirmed, 400).await;

        let summary = f
            .handler
            .calculate_financial_summary(&vendor("vendor-1"))
            .await
            .unwrap();
        assert_eq!(summary.total_sales, Money::from_units(1000));
        assert_eq!(summary.total_pending, Money::from_units(500));
        assert_eq!(summary.total_collected, Money::from_units(400));
        assert_eq!(summary.total_profit, Money::from_units(400));
        assert_eq!(summary.total_commissions, Money::from_units(100));
        assert_eq!(summary.quote_count, 3);
    }

    #[tokio::test]
    async fn overdue_and_upcoming_split_on_the_due_date() {
        let f = fixture().await;
        seed_quote(&f, "vendor-1", 1000, 0, QuoteStatus::Confirmed, -5).await;
        seed_quote(&f, "vendor-1", 800, 0, QuoteStatus::Confirmed, 3).await;
        seed_quote(&f, "vendor-1", 700, 0, QuoteStatus::Confirmed, 30).await;

        let overdue = f.handler.get_overdue_payments(&vendor("vendor-1")).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].amount, Money::from_units(1000));
        assert_eq!(overdue[0].days_overdue, 5);

        let upcoming = f
            .handler
            .get_upcoming_payments(&vendor("vendor-1"), 7)
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].amount, Money::from_units(800));
    }

    #[tokio::test]
    async fn settled_quote_has_no_obligations() {
        let f = fixture().await;
        let quote = seed_quote(&f, "vendor-1", 1000, 0, QuoteStatus::Confirmed, -5).await;
        pay(&f, &quote, 1000).await;

        let overdue = f.handler.get_overdue_payments(&vendor("vendor-1")).await.unwrap();
        assert!(overdue.is_empty());
    }
}
