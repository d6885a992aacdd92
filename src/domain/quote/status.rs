//! Quote status lifecycle.
//!
//! All transition validation in the crate derives from the single
//! [`TRANSITIONS`] table below. The application layer uses it for the
//! advisory pre-check, and the persistence adapters key their conditional
//! status updates on the same expected-from value, so the advisory and
//! authoritative checks cannot drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Lifecycle status of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// Being drafted by the vendor; not yet sent to the client.
    Draft,
    /// Sent to the client, awaiting a decision.
    Pending,
    /// Accepted by the client.
    Confirmed,
    /// Terminal. No outgoing transitions.
    Cancelled,
}

/// One edge of the status graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: QuoteStatus,
    pub to: QuoteStatus,
    /// Edge is only traversable by admins.
    pub requires_admin: bool,
}

/// The complete set of valid status edges.
///
/// `Cancelled` is absorbing: it appears only as a target.
pub const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        from: QuoteStatus::Draft,
        to: QuoteStatus::Pending,
        requires_admin: false,
    },
    TransitionRule {
        from: QuoteStatus::Draft,
        to: QuoteStatus::Cancelled,
        requires_admin: false,
    },
    TransitionRule {
        from: QuoteStatus::Pending,
        to: QuoteStatus::Confirmed,
        requires_admin: false,
    },
    TransitionRule {
        from: QuoteStatus::Pending,
        to: QuoteStatus::Cancelled,
        requires_admin: false,
    },
    TransitionRule {
        from: QuoteStatus::Confirmed,
        to: QuoteStatus::Cancelled,
        requires_admin: true,
    },
];

/// Why a transition was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDenial {
    /// The current status has no outgoing edges.
    Terminal { from: QuoteStatus },
    /// No edge exists between the two statuses.
    NoEdge {
        from: QuoteStatus,
        to: QuoteStatus,
        /// Targets the caller could reach instead.
        valid_targets: Vec<QuoteStatus>,
    },
    /// The edge exists but is admin-gated.
    RequiresAdmin { from: QuoteStatus, to: QuoteStatus },
}

impl fmt::Display for TransitionDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionDenial::Terminal { from } => {
                write!(f, "Quote is {} and cannot change status", from)
            }
            TransitionDenial::NoEdge {
                from,
                to,
                valid_targets,
            } => {
                let targets: Vec<&str> = valid_targets.iter().map(|s| s.as_str()).collect();
                write!(
                    f,
                    "Cannot transition from {} to {}; valid targets: {}",
                    from,
                    to,
                    targets.join(", ")
                )
            }
            TransitionDenial::RequiresAdmin { from, to } => {
                write!(
                    f,
                    "Insufficient privilege: {} to {} requires admin",
                    from, to
                )
            }
        }
    }
}

/// Outcome of an advisory transition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCheck {
    pub valid: bool,
    pub reason: Option<TransitionDenial>,
}

impl TransitionCheck {
    fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn invalid(reason: TransitionDenial) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Human-readable denial reason, if any.
    pub fn reason_text(&self) -> Option<String> {
        self.reason.as_ref().map(|r| r.to_string())
    }

    /// Converts the check into a `Result`, mapping privilege failures to
    /// `Forbidden` and everything else to `InvalidStateTransition`.
    pub fn into_result(self) -> Result<(), DomainError> {
        match self.reason {
            None => Ok(()),
            Some(denial) => {
                let code = match &denial {
                    TransitionDenial::RequiresAdmin { .. } => ErrorCode::Forbidden,
                    _ => ErrorCode::InvalidStateTransition,
                };
                let (from, to) = match &denial {
                    TransitionDenial::Terminal { from } => (*from, None),
                    TransitionDenial::NoEdge { from, to, .. }
                    | TransitionDenial::RequiresAdmin { from, to } => (*from, Some(*to)),
                };
                let mut err =
                    DomainError::new(code, denial.to_string()).with_detail("from", from.as_str());
                if let Some(to) = to {
                    err = err.with_detail("to", to.as_str());
                }
                Err(err)
            }
        }
    }
}

impl QuoteStatus {
    /// The status every new quote starts in.
    pub const INITIAL: QuoteStatus = QuoteStatus::Draft;

    /// Advisory transition check.
    ///
    /// Same-state transitions are always valid no-ops. The authoritative
    /// check is re-executed by the store as a conditional update keyed on
    /// the expected current status; this method exists so callers can
    /// reject obviously invalid requests before touching the store.
    pub fn check_transition(&self, to: QuoteStatus, is_admin: bool) -> TransitionCheck {
        if *self == to {
            return TransitionCheck::valid();
        }

        if self.is_terminal() {
            return TransitionCheck::invalid(TransitionDenial::Terminal { from: *self });
        }

        match TRANSITIONS.iter().find(|r| r.from == *self && r.to == to) {
            Some(rule) if rule.requires_admin && !is_admin => {
                TransitionCheck::invalid(TransitionDenial::RequiresAdmin {
                    from: *self,
                    to,
                })
            }
            Some(_) => TransitionCheck::valid(),
            None => TransitionCheck::invalid(TransitionDenial::NoEdge {
                from: *self,
                to,
                valid_targets: self.valid_transitions(is_admin),
            }),
        }
    }

    /// Returns the reachable target states from this status.
    ///
    /// Admin-gated edges are filtered out when `is_admin` is false.
    pub fn valid_transitions(&self, is_admin: bool) -> Vec<QuoteStatus> {
        TRANSITIONS
            .iter()
            .filter(|r| r.from == *self && (is_admin || !r.requires_admin))
            .map(|r| r.to)
            .collect()
    }

    /// Returns true if the status has no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        TRANSITIONS.iter().all(|r| r.from != *self)
    }

    /// Returns the canonical stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Pending => "pending",
            QuoteStatus::Confirmed => "confirmed",
            QuoteStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a stored status value.
    pub fn from_stored(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "draft" => Ok(QuoteStatus::Draft),
            "pending" => Ok(QuoteStatus::Pending),
            "confirmed" => Ok(QuoteStatus::Confirmed),
            "cancelled" => Ok(QuoteStatus::Cancelled),
            other => Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", other),
            )),
        }
    }

    /// All statuses, for exhaustive iteration in checks and tests.
    pub fn all() -> [QuoteStatus; 4] {
        [
            QuoteStatus::Draft,
            QuoteStatus::Pending,
            QuoteStatus::Confirmed,
            QuoteStatus::Cancelled,
        ]
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
