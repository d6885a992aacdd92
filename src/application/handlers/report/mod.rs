//! Read-side report handlers.

mod financial_report;

pub use financial_report::FinancialReportHandler;
