//! Payment bounded context: the ledger entity and financial reporting.

mod payment;
mod report;

pub use payment::{balance, PartialPayment, PaymentMethod};
pub use report::{
    classify_overdue, classify_upcoming, summarize, FinancialSummary, OverduePayment,
    QuoteFinancials, UpcomingPayment,
};
