//! Display strings for staff boards, the client tracking view, and the CLI.
//!
//! Labels are pt-BR because that is what the counter staff reads. The client
//! tracking view deliberately uses softer wording than the staff queues
//! (`Em preparo` instead of `Aguardando envio`).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::machine::OrderStatus;
use crate::money::PaymentMethod;

/// The shop operates in Rondônia.
pub const SHOP_TZ: Tz = chrono_tz::America::Porto_Velho;

/// Human-facing order number: `7` → `"#0007"`, `12345` → `"#12345"` (wide
/// numbers are never truncated), missing → `"#0000"`.
pub fn format_order_number(number: Option<i64>) -> String {
    match number {
        Some(n) => format!("#{n:04}"),
        None => "#0000".to_string(),
    }
}

/// Timestamp as the counter staff sees it, shop-local.
pub fn format_shop_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&SHOP_TZ).format("%d/%m/%Y %H:%M").to_string()
}

impl OrderStatus {
    /// Label used on staff queues and the admin order list.
    pub fn staff_label(&self) -> &'static str {
        match self {
            Self::AwaitingPayment => "Aguardando pagamento",
            Self::AwaitingDispatch => "Aguardando envio",
            Self::Delivered => "Entregue",
            Self::Cancelled => "Cancelado",
        }
    }

    /// Label used on the client's own order history.
    pub fn client_label(&self) -> &'static str {
        match self {
            Self::AwaitingPayment => "Pendente",
            Self::AwaitingDispatch => "Em preparo",
            Self::Delivered => "Concluído",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pix => "Pix",
            Self::Cash => "Dinheiro",
            Self::CreditCard => "Cartão",
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
