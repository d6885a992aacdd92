//! Financial reporting: per-quote figures, portfolio summaries, and
//! overdue/upcoming obligation classification.
//!
//! Everything here is pure computation over already-loaded quotes and
//! payments; the application layer is responsible for fetching and
//! scoping the data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, QuoteId, Timestamp};
use crate::domain::quote::{Quote, QuoteStatus};

use super::payment::{balance, PartialPayment};

/// Financial figures for a single quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteFinancials {
    pub quote_id: QuoteId,
    pub client_name: String,
    pub status: QuoteStatus,
    pub total_amount: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
    /// Revenue minus cost basis.
    pub estimated_profit: Money,
    /// Fixed percentage of revenue.
    pub estimated_commission: Money,
    /// Due date of the outstanding balance (the event date).
    pub due_date: Timestamp,
}

impl QuoteFinancials {
    /// Computes the figures for one quote from its payments.
    ///
    /// `commission_rate` is a decimal rate, e.g. 0.10 for 10%.
    pub fn compute(quote: &Quote, payments: &[PartialPayment], commission_rate: Decimal) -> Self {
        let amount_paid: Money = payments.iter().map(|p| p.effective_amount()).sum();
        Self {
            quote_id: quote.id,
            client_name: quote.client_name.clone(),
            status: quote.status,
            total_amount: quote.total_amount,
            amount_paid,
            balance_due: balance(quote.total_amount, payments),
            estimated_profit: quote.total_amount - quote.total_cost,
            estimated_commission: quote.total_amount.percentage(commission_rate),
            due_date: quote.event_date,
        }
    }
}

/// Portfolio-level roll-up of quote financials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Sum of confirmed quote totals.
    pub total_sales: Money,
    /// Sum of draft and pending quote totals.
    pub total_pending: Money,
    /// Sum of payments received across non-cancelled quotes.
    pub total_collected: Money,
    /// Estimated profit over confirmed quotes.
    pub total_profit: Money,
    /// Estimated commissions over confirmed quotes.
    pub total_commissions: Money,
    pub quote_count: usize,
}

/// Rolls per-quote figures into a portfolio summary.
///
/// Cancelled quotes contribute nothing except their count.
pub fn summarize(financials: &[QuoteFinancials]) -> FinancialSummary {
    let mut summary = FinancialSummary {
        quote_count: financials.len(),
        ..FinancialSummary::default()
    };
    for f in financials {
        match f.status {
            QuoteStatus::Confirmed => {
                summary.total_sales = summary.total_sales + f.total_amount;
                summary.total_profit = summary.total_profit + f.estimated_profit;
                summary.total_commissions = summary.total_commissions + f.estimated_commission;
            }
            QuoteStatus::Draft | QuoteStatus::Pending => {
                summary.total_pending = summary.total_pending + f.total_amount;
            }
            QuoteStatus::Cancelled => continue,
        }
        summary.total_collected = summary.total_collected + f.amount_paid;
    }
    summary
}

/// An outstanding balance whose due date has passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverduePayment {
    pub quote_id: QuoteId,
    pub client_name: String,
    pub amount: Money,
    pub due_date: Timestamp,
    pub days_overdue: i64,
}

/// An outstanding balance falling due within the lookahead window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPayment {
    pub quote_id: QuoteId,
    pub client_name: String,
    pub amount: Money,
    pub due_date: Timestamp,
    pub days_until_due: i64,
}

fn owes_money(f: &QuoteFinancials) -> bool {
    // A cancelled quote's balance is no longer owed.
    f.status != QuoteStatus::Cancelled && f.balance_due > Money::ZERO
}

/// Quotes with an outstanding balance past their due date,
/// most overdue first.
pub fn classify_overdue(financials: &[QuoteFinancials], now: Timestamp) -> Vec<OverduePayment> {
    let mut overdue: Vec<OverduePayment> = financials
        .iter()
        .filter(|f| owes_money(f) && f.due_date.is_before(&now))
        .map(|f| OverduePayment {
            quote_id: f.quote_id,
            client_name: f.client_name.clone(),
            amount: f.balance_due,
            due_date: f.due_date,
            days_overdue: now.days_since(&f.due_date),
        })
        .collect();
    overdue.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
    overdue
}

/// Quotes with an outstanding balance due within `window_days` from `now`,
/// soonest first.
pub fn classify_upcoming(
    financials: &[QuoteFinancials],
    now: Timestamp,
    window_days: i64,
) -> Vec<UpcomingPayment> {
    let horizon = now.add_days(window_days);
    let mut upcoming: Vec<UpcomingPayment> = financials
        .iter()
        .filter(|f| owes_money(f) && !f.due_date.is_before(&now) && !f.due_date.is_after(&horizon))
        .map(|f| UpcomingPayment {
            quote_id: f.quote_id,
            client_name: f.client_name.clone(),
            amount: f.balance_due,
            due_date: f.due_date,
            days_until_due: f.due_date.days_since(&now),
        })
        .collect();
    upcoming.sort_by(|a, b| a.days_until_due.cmp(&b.days_until_due));
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ClientId, UserId};
    use crate::domain::payment::PaymentMethod;

    fn rate() -> Decimal {
        "0.10".parse().unwrap()
    }

    fn quote(name: &str, amount: i64, cost: i64, status: QuoteStatus, due_in_days: i64) -> Quote {
        let mut q = Quote::new(
            ClientId::new(),
            name,
            UserId::new("vendor-1").unwrap(),
            Money::from_units(amount),
            Money::from_units(cost),
            Timestamp::now().add_days(due_in_days),
        )
        .unwrap();
        q.status = status;
        q
    }

    fn paid(quote: &Quote, amount: i64) -> PartialPayment {
        PartialPayment::new(
            quote.id,
            Money::from_units(amount),
            Timestamp::now(),
            PaymentMethod::Transfer,
            None,
            None,
            UserId::new("vendor-1").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn compute_derives_profit_and_commission() {
        let q = quote("Acme", 1000, 600, QuoteStatus::Confirmed, 10);
        let payments = vec![paid(&q, 400)];
        let f = QuoteFinancials::compute(&q, &payments, rate());

        assert_eq!(f.amount_paid, Money::from_units(400));
        assert_eq!(f.balance_due, Money::from_units(600));
        assert_eq!(f.estimated_profit, Money::from_units(400));
        assert_eq!(f.estimated_commission, Money::from_units(100));
    }

    #[test]
    fn summarize_splits_sales_and_pending_by_status() {
        let confirmed = quote("A", 1000, 600, QuoteStatus::Confirmed, 10);
        let pending = quote("B", 500, 300, QuoteStatus::Pending, 10);
        let draft = quote("C", 200, 100, QuoteStatus::Draft, 10);
        let cancelled = quote("D", 900, 100, QuoteStatus::Cancelled, 10);

        let financials: Vec<QuoteFinancials> = [&confirmed, &pending, &draft, &cancelled]
            .iter()
            .map(|q| QuoteFinancials::compute(q, &[], rate()))
            .collect();

        let summary = summarize(&financials);
        assert_eq!(summary.total_sales, Money::from_units(1000));
        assert_eq!(summary.total_pending, Money::from_units(700));
        assert_eq!(summary.total_profit, Money::from_units(400));
        assert_eq!(summary.total_commissions, Money::from_units(100));
        assert_eq!(summary.quote_count, 4);
    }

    #[test]
    fn overdue_requires_positive_balance_and_past_due_date() {
        let now = Timestamp::now();
        let past_due = quote("Late", 1000, 0, QuoteStatus::Confirmed, -5);
        let fully_paid = quote("Paid", 300, 0, QuoteStatus::Confirmed, -5);
        let future = quote("Early", 400, 0, QuoteStatus::Confirmed, 5);

        let settled = vec![paid(&fully_paid, 300)];
        let financials = vec![
            QuoteFinancials::compute(&past_due, &[], rate()),
            QuoteFinancials::compute(&fully_paid, &settled, rate()),
            QuoteFinancials::compute(&future, &[], rate()),
        ];

        let overdue = classify_overdue(&financials, now);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].client_name, "Late");
        assert_eq!(overdue[0].amount, Money::from_units(1000));
        assert_eq!(overdue[0].days_overdue, 5);
    }

    #[test]
    fn cancelled_quotes_are_never_overdue() {
        let cancelled = quote("Gone", 1000, 0, QuoteStatus::Cancelled, -10);
        let financials = vec![QuoteFinancials::compute(&cancelled, &[], rate())];
        assert!(classify_overdue(&financials, Timestamp::now()).is_empty());
    }

    #[test]
    fn upcoming_respects_the_window() {
        let now = Timestamp::now();
        let soon = quote("Soon", 100, 0, QuoteStatus::Pending, 3);
        let later = quote("Later", 100, 0, QuoteStatus::Pending, 20);

        let financials = vec![
            QuoteFinancials::compute(&soon, &[], rate()),
            QuoteFinancials::compute(&later, &[], rate()),
        ];

        let upcoming = classify_upcoming(&financials, now, 7);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].client_name, "Soon");
        assert_eq!(upcoming[0].days_until_due, 3);
    }

    #[test]
    fn overdue_sorted_most_overdue_first_and_upcoming_soonest_first() {
        let now = Timestamp::now();
        let a = quote("A", 100, 0, QuoteStatus::Confirmed, -1);
        let b = quote("B", 100, 0, QuoteStatus::Confirmed, -9);
        let financials = vec![
            QuoteFinancials::compute(&a, &[], rate()),
            QuoteFinancials::compute(&b, &[], rate()),
        ];
        let overdue = classify_overdue(&financials, now);
        assert_eq!(overdue[0].client_name, "B");

        let c = quote("C", 100, 0, QuoteStatus::Pending, 6);
        let d = quote("D", 100, 0, QuoteStatus::Pending, 2);
        let financials = vec![
            QuoteFinancials::compute(&c, &[], rate()),
            QuoteFinancials::compute(&d, &[], rate()),
        ];
        let upcoming = classify_upcoming(&financials, now, 7);
        assert_eq!(upcoming[0].client_name, "D");
    }
}
