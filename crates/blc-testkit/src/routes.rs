//! Axum router and all HTTP handlers for the fake collaborator.
//!
//! The surface mirrors the real counter API: cookie-session auth, role
//! gates, order lifecycle enforcement through [`OrderStatus::apply`] with
//! 409 on refused transitions, and per-role SSE feeds that greet every
//! subscriber with the `CONNECTED` sentinel before relaying bus events.
//!
//! `build_router` is the single entry point. Handlers are `pub(crate)` so
//! the scenario tests in `tests/` can compose the router directly; real
//! listeners are bound by [`crate::spawn`].

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;
use uuid::Uuid;

use blc_lifecycle::{normalize_phone, validate_client_identity, OrderAction, OrderStatus, Role};
use blc_schemas::{
    ClientLogin, LiveEvent, NewOrder, NewProduct, NewUser, Order, OrderItem, Product,
    ProductPatch, ProfilePatch, RegisterUser, RolesPatch, SessionUser, StaffLogin,
};

use crate::state::{AppState, FakeUser, SESSION_COOKIE};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete fake-API router wired to the given shared state.
///
/// Middleware layers are **not** applied here; [`crate::spawn`] attaches
/// them so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/login", post(staff_login))
        .route("/auth/client-login", post(client_login))
        .route("/auth/logout", post(logout))
        .route("/users/register", post(register))
        .route("/users/me", get(me).patch(update_me))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", patch(patch_user))
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", patch(patch_product))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/my-orders", get(my_orders))
        .route("/orders/:id/:action", patch(order_action))
        .route("/orders/sse/cashier", get(sse_cashier))
        .route("/orders/sse/dispatcher", get(sse_dispatcher))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Refusals and session plumbing
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn refuse(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

/// Pull the session token out of the `cookie` header, if any.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn session_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

fn clear_session_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("balcao_session=; Path=/; HttpOnly; Max-Age=0"),
    );
    headers
}

async fn session_user(st: &AppState, headers: &HeaderMap) -> Option<FakeUser> {
    let token = cookie_token(headers)?;
    let world = st.world.read().await;
    let user_id = world.sessions.get(&token)?.clone();
    world.user_by_id(&user_id).cloned()
}

/// 401 without a session, 403 without any of the allowed roles.
async fn require_role(
    st: &AppState,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<FakeUser, Response> {
    let Some(user) = session_user(st, headers).await else {
        return Err(refuse(StatusCode::UNAUTHORIZED, "not authenticated"));
    };
    if !user.roles.iter().any(|held| allowed.contains(held)) {
        return Err(refuse(StatusCode::FORBIDDEN, "missing required role"));
    }
    Ok(user)
}

// ---------------------------------------------------------------------------
// POST /auth/login  (staff)
// ---------------------------------------------------------------------------

pub(crate) async fn staff_login(
    State(st): State<Arc<AppState>>,
    Json(login): Json<StaffLogin>,
) -> Response {
    let mut world = st.world.write().await;
    let found = world
        .users
        .iter()
        .find(|u| {
            u.email.as_deref() == Some(login.email.as_str())
                && u.password.as_deref() == Some(login.password.as_str())
        })
        .cloned();
    let Some(user) = found else {
        return refuse(StatusCode::UNAUTHORIZED, "invalid credentials");
    };

    let token = Uuid::new_v4().to_string();
    world.sessions.insert(token.clone(), user.id.clone());
    drop(world);

    info!(user = %user.name, "staff login");
    (
        StatusCode::OK,
        session_headers(&token),
        Json(user.session_view()),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// POST /auth/client-login
// ---------------------------------------------------------------------------

/// Phone is the client identity key; unknown phones get 401 so the consumer
/// side can chain its register fallback.
pub(crate) async fn client_login(
    State(st): State<Arc<AppState>>,
    Json(login): Json<ClientLogin>,
) -> Response {
    let phone = normalize_phone(&login.phone);
    let mut world = st.world.write().await;
    let Some(user) = world.user_by_phone(&phone).cloned() else {
        return refuse(StatusCode::UNAUTHORIZED, "unknown client");
    };

    let token = Uuid::new_v4().to_string();
    world.sessions.insert(token.clone(), user.id.clone());
    drop(world);

    info!(user = %user.name, "client login");
    (
        StatusCode::OK,
        session_headers(&token),
        Json(user.session_view()),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// POST /users/register
// ---------------------------------------------------------------------------

/// Creates the client account but does **not** open a session; the consumer
/// retries login after registering.
pub(crate) async fn register(
    State(st): State<Arc<AppState>>,
    Json(reg): Json<RegisterUser>,
) -> Response {
    let phone = match validate_client_identity(&reg.name, &reg.phone) {
        Ok(digits) => digits,
        Err(e) => return refuse(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let mut world = st.world.write().await;
    if world.user_by_phone(&phone).is_some() {
        return refuse(StatusCode::CONFLICT, "phone already registered");
    }

    let user = FakeUser {
        id: Uuid::new_v4().to_string(),
        name: reg.name.trim().to_string(),
        email: None,
        password: None,
        phone: Some(phone),
        roles: vec![Role::Client],
    };
    world.users.push(user.clone());

    info!(user = %user.name, "client registered");
    (StatusCode::CREATED, Json(user.session_view())).into_response()
}

// ---------------------------------------------------------------------------
// POST /auth/logout
// ---------------------------------------------------------------------------

pub(crate) async fn logout(State(st): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie_token(&headers) {
        st.world.write().await.sessions.remove(&token);
    }
    (StatusCode::NO_CONTENT, clear_session_headers()).into_response()
}

// ---------------------------------------------------------------------------
// GET /users/me  +  PATCH /users/me
// ---------------------------------------------------------------------------

pub(crate) async fn me(State(st): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match session_user(&st, &headers).await {
        Some(user) => (StatusCode::OK, Json(user.session_view())).into_response(),
        None => refuse(StatusCode::UNAUTHORIZED, "not authenticated"),
    }
}

pub(crate) async fn update_me(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(patch): Json<ProfilePatch>,
) -> Response {
    let Some(user) = session_user(&st, &headers).await else {
        return refuse(StatusCode::UNAUTHORIZED, "not authenticated");
    };
    let phone = match validate_client_identity(&patch.name, &patch.phone) {
        Ok(digits) => digits,
        Err(e) => return refuse(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let mut world = st.world.write().await;
    let taken = world
        .users
        .iter()
        .any(|u| u.id != user.id && u.phone.as_deref() == Some(phone.as_str()));
    if taken {
        return refuse(StatusCode::CONFLICT, "phone already registered");
    }

    let Some(stored) = world.users.iter_mut().find(|u| u.id == user.id) else {
        return refuse(StatusCode::NOT_FOUND, "user not found");
    };
    stored.name = patch.name.trim().to_string();
    stored.phone = Some(phone);
    let view = stored.session_view();

    (StatusCode::OK, Json(view)).into_response()
}

// ---------------------------------------------------------------------------
// GET /products  +  admin product management
// ---------------------------------------------------------------------------

/// The catalog is public: the menu renders before any login.
pub(crate) async fn list_products(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let world = st.world.read().await;
    (StatusCode::OK, Json(world.products.clone()))
}

pub(crate) async fn create_product(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewProduct>,
) -> Response {
    if let Err(resp) = require_role(&st, &headers, &[Role::Admin]).await {
        return resp;
    }

    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: new.name,
        description: new.description,
        price: new.price,
        category: new.category,
        image_url: new.image_url,
        stock: new.stock.unwrap_or(0),
        is_active: true,
    };
    st.world.write().await.products.push(product.clone());

    info!(product = %product.name, "product created");
    (StatusCode::CREATED, Json(product)).into_response()
}

pub(crate) async fn patch_product(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<ProductPatch>,
) -> Response {
    if let Err(resp) = require_role(&st, &headers, &[Role::Admin]).await {
        return resp;
    }

    let mut world = st.world.write().await;
    let Some(product) = world.products.iter_mut().find(|p| p.id == id) else {
        return refuse(StatusCode::NOT_FOUND, "product not found");
    };

    if let Some(name) = patch.name {
        product.name = name;
    }
    if let Some(description) = patch.description {
        product.description = description;
    }
    if let Some(price) = patch.price {
        product.price = price;
    }
    if let Some(category) = patch.category {
        product.category = category;
    }
    if let Some(stock) = patch.stock {
        product.stock = stock;
    }
    if let Some(is_active) = patch.is_active {
        product.is_active = is_active;
    }

    (StatusCode::OK, Json(product.clone())).into_response()
}

// ---------------------------------------------------------------------------
// POST /orders  (checkout)
// ---------------------------------------------------------------------------

pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewOrder>,
) -> Response {
    if session_user(&st, &headers).await.is_none() {
        return refuse(StatusCode::UNAUTHORIZED, "not authenticated");
    }
    if new.items.is_empty() {
        return refuse(StatusCode::BAD_REQUEST, "order has no items");
    }

    let mut world = st.world.write().await;

    // Price from the live catalog and snapshot names; the payload carries
    // neither so a stale client can never fix its own prices.
    let mut total: i64 = 0;
    let mut items = Vec::with_capacity(new.items.len());
    for line in &new.items {
        if line.quantity == 0 {
            return refuse(StatusCode::BAD_REQUEST, "quantity must be at least 1");
        }
        let Some(product) = world.products.iter().find(|p| p.id == line.product_id) else {
            return refuse(
                StatusCode::BAD_REQUEST,
                &format!("unknown product {}", line.product_id),
            );
        };
        if !product.is_active {
            return refuse(
                StatusCode::CONFLICT,
                &format!("product {} is not available", product.name),
            );
        }
        total += product.price * i64::from(line.quantity);
        items.push(OrderItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: line.quantity,
        });
    }

    let change_for = if new.payment_method.takes_change_for() {
        new.change_for
    } else {
        None
    };

    let order = Order {
        id: Uuid::new_v4().to_string(),
        order_number: world.next_order_number,
        status: OrderStatus::AwaitingPayment,
        total_amount: total,
        payment_method: new.payment_method,
        change_for,
        created_at: Utc::now(),
        client_name: new.client_info.name.clone(),
        client_phone: normalize_phone(&new.client_info.phone),
        items,
    };
    world.next_order_number += 1;
    world.orders.push(order.clone());
    drop(world);

    info!(number = order.order_number, total, "order created");
    st.notify_created(&order.id);
    (StatusCode::CREATED, Json(order)).into_response()
}

// ---------------------------------------------------------------------------
// GET /orders  (staff queues)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub(crate) struct OrdersQuery {
    status: Option<OrderStatus>,
}

pub(crate) async fn list_orders(
    State(st): State<Arc<AppState>>,
    Query(q): Query<OrdersQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) =
        require_role(&st, &headers, &[Role::Admin, Role::Cashier, Role::Dispatcher]).await
    {
        return resp;
    }

    let world = st.world.read().await;
    let mut orders: Vec<Order> = world
        .orders
        .iter()
        .filter(|o| q.status.map_or(true, |wanted| o.status == wanted))
        .cloned()
        .collect();
    // Oldest first: counter staff serve the head of the queue.
    orders.sort_by_key(|o| o.order_number);

    (StatusCode::OK, Json(orders)).into_response()
}

// ---------------------------------------------------------------------------
// GET /orders/my-orders  (client history)
// ---------------------------------------------------------------------------

pub(crate) async fn my_orders(State(st): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(user) = session_user(&st, &headers).await else {
        return refuse(StatusCode::UNAUTHORIZED, "not authenticated");
    };

    let phone = user.phone.unwrap_or_default();
    let world = st.world.read().await;
    let mut orders: Vec<Order> = world
        .orders
        .iter()
        .filter(|o| o.client_phone == phone)
        .cloned()
        .collect();
    // Most recent first for history.
    orders.sort_by_key(|o| std::cmp::Reverse(o.order_number));

    (StatusCode::OK, Json(orders)).into_response()
}

// ---------------------------------------------------------------------------
// PATCH /orders/:id/:action  (lifecycle transitions)
// ---------------------------------------------------------------------------

fn parse_action(raw: &str) -> Option<OrderAction> {
    [
        OrderAction::ConfirmPayment,
        OrderAction::Dispatch,
        OrderAction::Cancel,
    ]
    .into_iter()
    .find(|a| a.as_str() == raw)
}

pub(crate) async fn order_action(
    State(st): State<Arc<AppState>>,
    Path((id, action)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(action) = parse_action(&action) else {
        return refuse(StatusCode::NOT_FOUND, "unknown action");
    };
    let Some(user) = session_user(&st, &headers).await else {
        return refuse(StatusCode::UNAUTHORIZED, "not authenticated");
    };
    if !action.permitted_for(&user.roles) {
        return refuse(StatusCode::FORBIDDEN, "missing required role");
    }

    let mut world = st.world.write().await;
    let Some(order) = world.orders.iter_mut().find(|o| o.id == id) else {
        return refuse(StatusCode::NOT_FOUND, "order not found");
    };

    match order.status.apply(action) {
        Ok(next) => {
            order.status = next;
            let snap = order.clone();
            drop(world);

            info!(number = snap.order_number, status = %snap.status, %action, "order advanced");
            st.notify_updated(&snap.id, snap.status);
            (StatusCode::OK, Json(snap)).into_response()
        }
        // Replay or race: the machine names the exact refusal.
        Err(e) => refuse(StatusCode::CONFLICT, &e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Admin user management
// ---------------------------------------------------------------------------

pub(crate) async fn list_users(State(st): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_role(&st, &headers, &[Role::Admin]).await {
        return resp;
    }

    let world = st.world.read().await;
    let views: Vec<SessionUser> = world.users.iter().map(FakeUser::session_view).collect();
    (StatusCode::OK, Json(views)).into_response()
}

pub(crate) async fn create_user(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(new): Json<NewUser>,
) -> Response {
    if let Err(resp) = require_role(&st, &headers, &[Role::Admin]).await {
        return resp;
    }

    let mut world = st.world.write().await;
    let taken = world
        .users
        .iter()
        .any(|u| u.email.as_deref() == Some(new.email.as_str()));
    if taken {
        return refuse(StatusCode::CONFLICT, "email already registered");
    }

    let user = FakeUser {
        id: Uuid::new_v4().to_string(),
        name: new.name,
        email: Some(new.email),
        password: Some(new.password),
        phone: new.phone.as_deref().map(normalize_phone),
        roles: new.roles,
    };
    world.users.push(user.clone());

    info!(user = %user.name, "user created");
    (StatusCode::CREATED, Json(user.session_view())).into_response()
}

/// Full-replace role assignment.
pub(crate) async fn patch_user(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<RolesPatch>,
) -> Response {
    if let Err(resp) = require_role(&st, &headers, &[Role::Admin]).await {
        return resp;
    }

    let mut world = st.world.write().await;
    let Some(stored) = world.users.iter_mut().find(|u| u.id == id) else {
        return refuse(StatusCode::NOT_FOUND, "user not found");
    };
    stored.roles = patch.roles;
    let view = stored.session_view();

    (StatusCode::OK, Json(view)).into_response()
}

// ---------------------------------------------------------------------------
// GET /orders/sse/{cashier,dispatcher}  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn sse_cashier(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    role_feed(&st, &headers, Role::Cashier).await
}

pub(crate) async fn sse_dispatcher(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    role_feed(&st, &headers, Role::Dispatcher).await
}

async fn role_feed(st: &AppState, headers: &HeaderMap, role: Role) -> Response {
    let user = match require_role(st, headers, &[role, Role::Admin]).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let bus = match role {
        Role::Dispatcher => st.dispatcher_bus.clone(),
        _ => st.cashier_bus.clone(),
    };

    let mut headers_out = HeaderMap::new();
    headers_out.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers_out.insert("Connection", HeaderValue::from_static("keep-alive"));

    info!(user = %user.name, channel = role.as_str(), "live subscriber");
    let events = greet_then_relay(bus.subscribe());
    (headers_out, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

/// The sentinel must be the first frame on every subscription; everything
/// after rides in the data payload's `type` field (no SSE event names).
fn greet_then_relay(
    rx: broadcast::Receiver<LiveEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let hello = futures_util::stream::iter(
        serde_json::to_string(&LiveEvent::Connected)
            .ok()
            .map(|data| Ok::<_, Infallible>(Event::default().data(data))),
    );
    let relay = BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(ev) => {
                let data = serde_json::to_string(&ev).ok()?;
                Some(Ok(Event::default().data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    });
    hello.chain(relay)
}
