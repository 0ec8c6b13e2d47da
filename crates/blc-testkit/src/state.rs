//! In-memory world behind the fake collaborator.
//!
//! One `World` under an async `RwLock` holds everything the fake knows;
//! two broadcast buses fan live events out to role-scoped SSE subscribers.
//! Seeds are stable so scenario tests can name fixture credentials instead
//! of re-creating them per test.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use blc_lifecycle::{OrderStatus, Role};
use blc_schemas::{LiveEvent, Order, Product, SessionUser};

// ---------------------------------------------------------------------------
// Seed fixtures
// ---------------------------------------------------------------------------

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "balcao_session";

pub const ADMIN_EMAIL: &str = "admin@balcao.test";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const CASHIER_EMAIL: &str = "caixa@balcao.test";
pub const CASHIER_PASSWORD: &str = "caixa123";
pub const DISPATCHER_EMAIL: &str = "entrega@balcao.test";
pub const DISPATCHER_PASSWORD: &str = "entrega123";

/// Seed client known to `POST /auth/client-login` without registering first.
pub const SEED_CLIENT_NAME: &str = "João da Silva";
pub const SEED_CLIENT_PHONE: &str = "69999990001";

// ---------------------------------------------------------------------------
// FakeUser
// ---------------------------------------------------------------------------

/// Stored user record. `password` is plaintext: this is a test double, not
/// an auth implementation.
#[derive(Clone, Debug)]
pub struct FakeUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub roles: Vec<Role>,
}

impl FakeUser {
    /// The wire shape handed to authenticated callers.
    pub fn session_view(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            roles: self.roles.clone(),
        }
    }
}

fn seed_staff(name: &str, email: &str, password: &str, roles: &[Role]) -> FakeUser {
    FakeUser {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        phone: None,
        roles: roles.to_vec(),
    }
}

fn seed_product(name: &str, description: &str, price: i64, category: &str) -> Product {
    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
        image_url: None,
        stock: 50,
        is_active: true,
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Everything the fake knows. One lock, no partial views.
#[derive(Debug)]
pub struct World {
    pub users: Vec<FakeUser>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    /// session token -> user id
    pub sessions: HashMap<String, String>,
    pub next_order_number: i64,
}

impl World {
    /// Fixture world: three staff accounts, one known client, a small
    /// catalog with one inactive product, and no orders yet.
    pub fn seeded() -> Self {
        let users = vec![
            seed_staff("Administrador", ADMIN_EMAIL, ADMIN_PASSWORD, &[Role::Admin]),
            seed_staff("Caixa", CASHIER_EMAIL, CASHIER_PASSWORD, &[Role::Cashier]),
            seed_staff(
                "Entregador",
                DISPATCHER_EMAIL,
                DISPATCHER_PASSWORD,
                &[Role::Dispatcher],
            ),
            FakeUser {
                id: Uuid::new_v4().to_string(),
                name: SEED_CLIENT_NAME.to_string(),
                email: None,
                password: None,
                phone: Some(SEED_CLIENT_PHONE.to_string()),
                roles: vec![Role::Client],
            },
        ];

        let mut products = vec![
            seed_product("X-Burger", "Pão, hambúrguer e queijo", 1800, "Lanches"),
            seed_product("X-Salada", "Com alface e tomate", 2000, "Lanches"),
            seed_product("Coca-Cola Lata", "350ml gelada", 600, "Bebidas"),
            seed_product("Batata Frita", "Porção média", 1200, "Porções"),
        ];
        // One sold-out item so active/inactive filtering has material.
        let mut pudim = seed_product("Pudim", "Fatia", 900, "Sobremesas");
        pudim.is_active = false;
        products.push(pudim);

        Self {
            users,
            products,
            orders: Vec::new(),
            sessions: HashMap::new(),
            next_order_number: 1,
        }
    }

    pub fn user_by_id(&self, id: &str) -> Option<&FakeUser> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_phone(&self, phone: &str) -> Option<&FakeUser> {
        self.users.iter().find(|u| u.phone.as_deref() == Some(phone))
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub world: Arc<RwLock<World>>,
    /// Bus backing `GET /orders/sse/cashier`.
    pub cashier_bus: broadcast::Sender<LiveEvent>,
    /// Bus backing `GET /orders/sse/dispatcher`.
    pub dispatcher_bus: broadcast::Sender<LiveEvent>,
}

impl AppState {
    pub fn seeded() -> Self {
        let (cashier_bus, _rx) = broadcast::channel::<LiveEvent>(1024);
        let (dispatcher_bus, _rx) = broadcast::channel::<LiveEvent>(1024);
        Self {
            world: Arc::new(RwLock::new(World::seeded())),
            cashier_bus,
            dispatcher_bus,
        }
    }

    /// New orders land in the cashier queue, so only that bus is notified.
    pub fn notify_created(&self, order_id: &str) {
        let _ = self.cashier_bus.send(LiveEvent::OrderCreated {
            order_id: order_id.to_string(),
        });
    }

    /// Transitions move orders into or out of both queues; both buses hear.
    pub fn notify_updated(&self, order_id: &str, status: OrderStatus) {
        let ev = LiveEvent::OrderUpdated {
            order_id: order_id.to_string(),
            status,
        };
        let _ = self.cashier_bus.send(ev.clone());
        let _ = self.dispatcher_bus.send(ev);
    }
}
