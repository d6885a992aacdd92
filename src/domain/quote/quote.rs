//! Quote aggregate.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, Money, QuoteId, Timestamp, UserId, UserRole,
    ValidationError,
};

use super::QuoteStatus;

/// A priced proposal tied to a client and an owning vendor.
///
/// The status field only ever changes along the edges of the transition
/// table in [`super::status`]; handlers enforce that through the
/// repository's conditional update, never by assigning the field
/// directly from stale state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub client_id: ClientId,
    /// Denormalized for reporting; the client record itself lives outside
    /// this crate.
    pub client_name: String,
    pub vendor_id: UserId,
    pub status: QuoteStatus,
    /// Agreed price. Zero is allowed (e.g. a courtesy quote).
    pub total_amount: Money,
    /// Cost basis used for profit estimation.
    pub total_cost: Money,
    /// Date of the event the quote is for. The outstanding balance falls
    /// due on this date.
    pub event_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Quote {
    /// Creates a new draft quote.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_id: ClientId,
        client_name: impl Into<String>,
        vendor_id: UserId,
        total_amount: Money,
        total_cost: Money,
        event_date: Timestamp,
    ) -> Result<Self, ValidationError> {
        let client_name = client_name.into();
        if client_name.trim().is_empty() {
            return Err(ValidationError::empty_field("client_name"));
        }
        if total_amount.is_negative() {
            return Err(ValidationError::negative("total_amount", total_amount));
        }
        if total_cost.is_negative() {
            return Err(ValidationError::negative("total_cost", total_cost));
        }
        let now = Timestamp::now();
        Ok(Self {
            id: QuoteId::new(),
            client_id,
            client_name,
            vendor_id,
            status: QuoteStatus::INITIAL,
            total_amount,
            total_cost,
            event_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if the user owns this quote.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.vendor_id == user_id
    }

    /// Checks that the actor may manage this quote (owner or admin).
    pub fn check_managed_by(&self, user_id: &UserId, role: UserRole) -> Result<(), DomainError> {
        if role.is_admin() || self.is_owned_by(user_id) {
            return Ok(());
        }
        Err(DomainError::forbidden("Quote belongs to another vendor")
            .with_detail("quote_id", self.id.to_string())
            .with_detail("user_id", user_id.to_string()))
    }

    /// Whether the quote is in a state an admin may physically delete it in.
    ///
    /// Confirmed and cancelled quotes are never deleted; they are part of
    /// the financial record.
    pub fn is_deletable(&self) -> bool {
        matches!(self.status, QuoteStatus::Draft | QuoteStatus::Pending)
    }

    /// Checks deletion preconditions: admin role and a deletable status.
    pub fn check_deletable_by(&self, role: UserRole) -> Result<(), DomainError> {
        if !role.is_admin() {
            return Err(DomainError::forbidden("Only admins may delete quotes")
                .with_detail("quote_id", self.id.to_string()));
        }
        if !self.is_deletable() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("A {} quote cannot be deleted", self.status),
            )
            .with_detail("quote_id", self.id.to_string()));
        }
        Ok(())
    }

    /// Whether the quote is in a protected state: price changes require
    /// an admin and a critical audit entry.
    pub fn is_price_protected(&self) -> bool {
        matches!(self.status, QuoteStatus::Confirmed | QuoteStatus::Cancelled)
    }

    /// Full JSON snapshot for audit trails.
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "client_id": self.client_id,
            "client_name": self.client_name,
            "vendor_id": self.vendor_id,
            "status": self.status,
            "total_amount": self.total_amount,
            "total_cost": self.total_cost,
            "event_date": self.event_date,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}
