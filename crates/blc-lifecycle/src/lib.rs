//! Order-lifecycle domain logic for Balcão.
//!
//! Pure deterministic logic. No IO, no clocks except formatting helpers that
//! receive timestamps as arguments. Everything here is shared by both sides
//! of the wire: the consumer crates (`blc-client`, `blc-dashboard`) use it to
//! know which action applies to a queue, and the in-process fake collaborator
//! (`blc-testkit`) uses the same transition function to enforce the contract.
//!
//! Modules:
//! - [`machine`]: order statuses and the transition function.
//! - [`access`]: staff roles, per-action permission sets, landing priority.
//! - [`money`]: integer-cents money math, BRL formatting, payment methods.
//! - [`label`]: display strings (order numbers, status labels, timestamps).
//! - [`contact`]: client identity validation (name, Brazilian phone).

pub mod access;
pub mod contact;
pub mod label;
pub mod machine;
pub mod money;

pub use access::{is_staff, primary_staff_role, Role};
pub use contact::{normalize_phone, validate_client_identity, IdentityError};
pub use label::{format_order_number, format_shop_time, SHOP_TZ};
pub use machine::{OrderAction, OrderStatus, TransitionError};
pub use money::{change_due, format_brl, parse_brl_cents, MoneyParseError, PaymentMethod};
