//! Order status machine.
//!
//! # Design
//!
//! Explicit state machine for one order's fulfillment lifecycle. Transitions
//! are applied via [`OrderStatus::apply`], which enforces one invariant:
//!
//! 1. **Legal transitions only.** An action that does not apply to the
//!    current status returns [`TransitionError`] and changes nothing. The
//!    collaborator surfaces this as a 409; consumers surface the message and
//!    refetch authoritative state.
//!
//! # State diagram
//!
//! ```text
//!   checkout            confirm-payment                dispatch
//!  ─────────► AwaitingPayment ────────► AwaitingDispatch ────────► Delivered
//!                   │                          │                   (terminal)
//!                   │ cancel                   │ cancel
//!                   └──────────┬───────────────┘
//!                              ▼
//!                          Cancelled
//!                          (terminal)
//! ```
//!
//! The alternate vocabulary `PENDING` / `IN_PROGRESS` / `DONE` used by one
//! historical client surface is accepted as deserialization aliases and never
//! produced; display mapping lives in [`crate::label`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Canonical fulfillment statuses, in wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order submitted at checkout; cashier has not confirmed payment.
    #[serde(alias = "PENDING")]
    AwaitingPayment,
    /// Payment confirmed; waiting for the dispatcher to send it out.
    #[serde(alias = "IN_PROGRESS")]
    AwaitingDispatch,
    /// Handed to the client. **Terminal.**
    #[serde(alias = "DONE")]
    Delivered,
    /// Cancelled by an admin. **Terminal.**
    Cancelled,
}

impl OrderStatus {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Wire spelling, e.g. for `?status=` query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::AwaitingDispatch => "AWAITING_DISPATCH",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Apply a staff action to this status.
    ///
    /// # Errors
    /// Returns [`TransitionError`] when the action does not apply to the
    /// current status, including the replay case (confirm-payment on an
    /// order that already advanced), which callers surface and then refetch.
    pub fn apply(self, action: OrderAction) -> Result<OrderStatus, TransitionError> {
        use OrderAction::*;
        use OrderStatus::*;

        match (self, action) {
            (AwaitingPayment, ConfirmPayment) => Ok(AwaitingDispatch),
            (AwaitingDispatch, Dispatch) => Ok(Delivered),

            // Cancel is legal from any non-terminal status.
            (from, Cancel) if !from.is_terminal() => Ok(Cancelled),

            (from, action) => Err(TransitionError { from, action }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderAction
// ---------------------------------------------------------------------------

/// Staff actions that drive status transitions.
///
/// Display spelling matches the collaborator's endpoint path segments
/// (`PATCH /orders/:id/confirm-payment` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    ConfirmPayment,
    Dispatch,
    Cancel,
}

impl OrderAction {
    /// Endpoint path segment for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmPayment => "confirm-payment",
            Self::Dispatch => "dispatch",
            Self::Cancel => "cancel",
        }
    }

    /// The status a queue must be filtered by for this action to apply.
    /// `None` for [`Cancel`][Self::Cancel], which has no single home queue.
    pub fn source_status(&self) -> Option<OrderStatus> {
        match self {
            Self::ConfirmPayment => Some(OrderStatus::AwaitingPayment),
            Self::Dispatch => Some(OrderStatus::AwaitingDispatch),
            Self::Cancel => None,
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Returned when an action cannot legally be applied to the current status.
///
/// Not a halt condition: with two staff screens racing over one queue this
/// is an expected outcome. Consumers surface the message, keep local state
/// unchanged, and refetch the authoritative queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    /// The status the order held when the action arrived.
    pub from: OrderStatus,
    /// The refused action.
    pub action: OrderAction,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "order cannot {} while {}",
            self.action, self.from
        )
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
