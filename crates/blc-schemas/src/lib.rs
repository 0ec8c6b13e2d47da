//! Wire types for the collaborator REST surface and the live channel.
//!
//! Field names are the wire names (snake_case throughout; the legacy camel
//! and nested-item shapes are normalized here, not at call sites).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use blc_lifecycle::{OrderStatus, PaymentMethod, Role};

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: i64,
    pub status: OrderStatus,
    /// Integer cents.
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    /// Integer cents; only present on CASH orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_for: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub client_name: String,
    pub client_phone: String,
    pub items: Vec<OrderItem>,
}

/// Line item with the product name snapshotted at order time, so history
/// renders after a product is renamed or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
}

/// Checkout payload. `change_for` is serialized even when null; the
/// collaborator treats an absent field and an explicit null the same, but
/// old clients always sent the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub client_info: ClientRef,
    pub items: Vec<NewOrderItem>,
    pub payment_method: PaymentMethod,
    pub change_for: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRef {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Integer cents.
    pub price: i64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

/// Partial update; absent fields are left unchanged by the collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Users and sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Always a list in memory. Old collaborator revisions send a single
    /// `role` string; both shapes deserialize into this field.
    #[serde(default, alias = "role", deserialize_with = "one_or_many_roles")]
    pub roles: Vec<Role>,
}

fn one_or_many_roles<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Role),
        Many(Vec<Role>),
    }

    match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(OneOrMany::One(role)) => Ok(vec![role]),
        Some(OneOrMany::Many(roles)) => Ok(roles),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientLogin {
    pub phone: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub phone: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub roles: Vec<Role>,
}

/// Role assignment is a full replace, not a delta: toggling one role sends
/// the complete new list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesPatch {
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub name: String,
    pub phone: String,
}

// ---------------------------------------------------------------------------
// Live channel
// ---------------------------------------------------------------------------

/// Handshake sentinel sent as the first event on every live subscription.
pub const LIVE_HANDSHAKE: &str = "CONNECTED";

/// Events emitted on the live channel, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveEvent {
    Connected,
    OrderCreated { order_id: String },
    OrderUpdated { order_id: String, status: OrderStatus },
}

/// Loose consumer-side view of a live message. Consumers must refresh on
/// *any* non-handshake type, including types they do not know, so this
/// captures only the tag.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
}

impl LiveEnvelope {
    pub fn is_handshake(&self) -> bool {
        self.kind == LIVE_HANDSHAKE
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
