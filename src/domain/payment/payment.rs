//! Partial payment entity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    DomainError, ErrorCode, Money, PaymentId, QuoteId, Timestamp, UserId, ValidationError,
};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
    Check,
    Other,
}

impl PaymentMethod {
    /// Returns the canonical stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Check => "check",
            PaymentMethod::Other => "other",
        }
    }

    /// Parses a stored payment method value.
    pub fn from_stored(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            "card" => Ok(PaymentMethod::Card),
            "check" => Ok(PaymentMethod::Check),
            "other" => Ok(PaymentMethod::Other),
            value => Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payment method: {}", value),
            )),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One installment against a quote's total.
///
/// Immutable once created, except for the single soft-cancellation flip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialPayment {
    pub id: PaymentId,
    pub quote_id: QuoteId,
    pub amount: Money,
    pub payment_date: Timestamp,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

impl PartialPayment {
    /// Creates a new payment record. Amount must be strictly positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quote_id: QuoteId,
        amount: Money,
        payment_date: Timestamp,
        payment_method: PaymentMethod,
        reference_number: Option<String>,
        notes: Option<String>,
        created_by: UserId,
    ) -> Result<Self, ValidationError> {
        if amount <= Money::ZERO {
            return Err(ValidationError::not_positive("amount", amount));
        }
        Ok(Self {
            id: PaymentId::new(),
            quote_id,
            amount,
            payment_date,
            payment_method,
            reference_number,
            notes,
            is_cancelled: false,
            cancellation_reason: None,
            created_by,
            created_at: Timestamp::now(),
        })
    }

    /// Flips the cancellation flag exactly once.
    ///
    /// A second attempt is a conflict, not a silent no-op: the caller
    /// asked to change state that has already changed under them.
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), DomainError> {
        if self.is_cancelled {
            return Err(DomainError::new(
                ErrorCode::PaymentAlreadyCancelled,
                "Payment is already cancelled",
            )
            .with_detail("payment_id", self.id.to_string()));
        }
        self.is_cancelled = true;
        self.cancellation_reason = reason;
        Ok(())
    }

    /// Amount counted toward the quote balance (zero when cancelled).
    pub fn effective_amount(&self) -> Money {
        if self.is_cancelled {
            Money::ZERO
        } else {
            self.amount
        }
    }
}

/// Balance due: quote total minus all non-cancelled payments.
pub fn balance(total_amount: Money, payments: &[PartialPayment]) -> Money {
    let paid: Money = payments.iter().map(|p| p.effective_amount()).sum();
    total_amount - paid
}
