//! Operator-facing flows over the collaborator API.
//!
//! This crate is the screen-shaped layer: it decides where a session lands,
//! what a queue shows, how a checkout proceeds, and what the back office
//! edits, while the collaborator stays authoritative for every decision
//! that matters.
//!
//! ```text
//!   client side                          staff side
//!
//!   ClientFlow ── cart + session        OrdersBoard ── queue snapshot
//!       │                                    │
//!       └───────────── ApiClient ────────────┘
//!                          │
//!                  collaborator API
//! ```
//!
//! Nothing here caches authority: boards refetch after every action, flows
//! revalidate identity locally only to keep bad input off the wire.

pub mod admin;
pub mod board;
pub mod checkout;
pub mod nav;

pub use admin::AdminPanel;
pub use board::{BoardScope, OrdersBoard};
pub use checkout::{ClientFlow, FlowError};
pub use nav::{resolve_staff_landing, staff_landing, staff_logout, Route};
