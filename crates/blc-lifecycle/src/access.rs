//! Staff roles and transition permissions.
//!
//! Roles are modeled as a **list** on the session user; a user holds zero or
//! many. Permission checks therefore take a slice, and the landing decision
//! picks the first match in a fixed priority order so multi-role users get a
//! deterministic dashboard.

use serde::{Deserialize, Serialize};

use crate::machine::OrderAction;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Session roles, in wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Cashier,
    Dispatcher,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Cashier => "CASHIER",
            Self::Dispatcher => "DISPATCHER",
            Self::Client => "CLIENT",
        }
    }

    /// `true` for roles that may open any staff surface at all.
    pub fn is_staff(&self) -> bool {
        !matches!(self, Self::Client)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `true` when at least one held role is a staff role.
pub fn is_staff(roles: &[Role]) -> bool {
    roles.iter().any(Role::is_staff)
}

/// The role that decides a staff user's landing dashboard.
///
/// Priority: Admin, then Cashier, then Dispatcher. Returns `None` for
/// client-only (or empty) role lists; the caller falls through to login.
pub fn primary_staff_role(roles: &[Role]) -> Option<Role> {
    for candidate in [Role::Admin, Role::Cashier, Role::Dispatcher] {
        if roles.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Action permissions
// ---------------------------------------------------------------------------

impl OrderAction {
    /// Roles permitted to invoke this action.
    ///
    /// Admin is permitted the queue actions as well as cancel: the admin
    /// overview links into both queues, and a multi-role model must not force
    /// a re-login per queue.
    pub fn permitted_roles(&self) -> &'static [Role] {
        match self {
            Self::ConfirmPayment => &[Role::Cashier, Role::Admin],
            Self::Dispatch => &[Role::Dispatcher, Role::Admin],
            Self::Cancel => &[Role::Admin],
        }
    }

    /// `true` when any held role is in this action's permitted set.
    pub fn permitted_for(&self, roles: &[Role]) -> bool {
        roles
            .iter()
            .any(|held| self.permitted_roles().contains(held))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
