//! In-process scenario tests for the fake collaborator's REST surface.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot`, with no network I/O involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use blc_testkit::{routes, state::AppState, CASHIER_EMAIL, CASHIER_PASSWORD, SEED_CLIENT_PHONE};
use blc_testkit::{ADMIN_EMAIL, ADMIN_PASSWORD, DISPATCHER_EMAIL, DISPATCHER_PASSWORD};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn req(method: &str, uri: &str, cookie: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Drive the router with a single request; returns (status, headers, body).
async fn call(
    st: &Arc<AppState>,
    request: Request<Body>,
) -> (StatusCode, HeaderMap, bytes::Bytes) {
    let resp = routes::build_router(Arc::clone(st))
        .oneshot(request)
        .await
        .expect("oneshot failed");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, headers, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

/// First `set-cookie` pair, ready to send back as a `cookie` header.
fn cookie_pair(headers: &HeaderMap) -> String {
    headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(';').next())
        .expect("response carries no set-cookie")
        .to_string()
}

async fn staff_session(st: &Arc<AppState>, email: &str, password: &str) -> String {
    let (status, headers, _) = call(
        st,
        req(
            "POST",
            "/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "staff fixture login failed");
    cookie_pair(&headers)
}

async fn client_session(st: &Arc<AppState>) -> String {
    let (status, headers, _) = call(
        st,
        req(
            "POST",
            "/auth/client-login",
            None,
            Some(serde_json::json!({ "phone": SEED_CLIENT_PHONE, "name": "João" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "seed client login failed");
    cookie_pair(&headers)
}

async fn product_id(st: &Arc<AppState>, name: &str) -> String {
    let (_, _, body) = call(st, req("GET", "/products", None, None)).await;
    let products = parse_json(body);
    products
        .as_array()
        .expect("products is an array")
        .iter()
        .find(|p| p["name"] == name)
        .unwrap_or_else(|| panic!("no product named {name}"))["id"]
        .as_str()
        .expect("product id is a string")
        .to_string()
}

/// Checkout one X-Burger as the seed client; returns (order json, cookie).
async fn place_burger_order(st: &Arc<AppState>) -> (serde_json::Value, String) {
    let cookie = client_session(st).await;
    let burger = product_id(st, "X-Burger").await;
    let (status, _, body) = call(
        st,
        req(
            "POST",
            "/orders",
            Some(&cookie),
            Some(serde_json::json!({
                "client_info": { "name": "João da Silva", "phone": SEED_CLIENT_PHONE },
                "items": [ { "product_id": burger, "quantity": 1 } ],
                "payment_method": "PIX",
                "change_for": null,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "checkout failed");
    (parse_json(body), cookie)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn menu_is_public_and_carries_inactive_products() {
    let st = Arc::new(AppState::seeded());

    let (status, _, body) = call(&st, req("GET", "/products", None, None)).await;
    assert_eq!(status, StatusCode::OK);

    let products = parse_json(body);
    let products = products.as_array().expect("array");
    assert_eq!(products.len(), 5);

    let pudim = products
        .iter()
        .find(|p| p["name"] == "Pudim")
        .expect("seeded Pudim present");
    assert_eq!(pudim["is_active"], false, "Pudim seeds sold out");
}

// ---------------------------------------------------------------------------
// Client auth: login, register fallback, profile
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_phone_is_401_until_registered() {
    let st = Arc::new(AppState::seeded());
    let login = serde_json::json!({ "phone": "(69) 98888-0002", "name": "Maria" });

    let (status, _, body) =
        call(&st, req("POST", "/auth/client-login", None, Some(login.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parse_json(body)["error"], "unknown client");

    // Register does not open a session; it only creates the account.
    let (status, headers, body) =
        call(&st, req("POST", "/users/register", None, Some(login.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert_eq!(parse_json(body)["phone"], "69988880002", "phone stored normalized");

    // Retry login now succeeds with a cookie.
    let (status, headers, _) =
        call(&st, req("POST", "/auth/client-login", None, Some(login))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie_pair(&headers).starts_with("balcao_session="));
}

#[tokio::test]
async fn register_refuses_bad_identity_before_creating() {
    let st = Arc::new(AppState::seeded());

    let (status, _, body) = call(
        &st,
        req(
            "POST",
            "/users/register",
            None,
            Some(serde_json::json!({ "phone": "123", "name": "Maria" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["error"], "phone must have at least 10 digits");
}

#[tokio::test]
async fn profile_update_round_trips_through_me() {
    let st = Arc::new(AppState::seeded());
    let cookie = client_session(&st).await;

    let (status, _, _) = call(
        &st,
        req(
            "PATCH",
            "/users/me",
            Some(&cookie),
            Some(serde_json::json!({ "name": "João Atualizado", "phone": "(69) 99999-0001" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = call(&st, req("GET", "/users/me", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    let me = parse_json(body);
    assert_eq!(me["name"], "João Atualizado");
    assert_eq!(me["phone"], "69999990001");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let st = Arc::new(AppState::seeded());
    let cookie = client_session(&st).await;

    let (status, _, _) = call(&st, req("POST", "/auth/logout", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = call(&st, req("GET", "/users/me", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "token must be dead after logout");
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_requires_a_session() {
    let st = Arc::new(AppState::seeded());
    let burger = product_id(&st, "X-Burger").await;

    let (status, _, _) = call(
        &st,
        req(
            "POST",
            "/orders",
            None,
            Some(serde_json::json!({
                "client_info": { "name": "João", "phone": SEED_CLIENT_PHONE },
                "items": [ { "product_id": burger, "quantity": 1 } ],
                "payment_method": "PIX",
                "change_for": null,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_prices_from_catalog_and_numbers_sequentially() {
    let st = Arc::new(AppState::seeded());
    let cookie = client_session(&st).await;
    let burger = product_id(&st, "X-Burger").await;
    let coca = product_id(&st, "Coca-Cola Lata").await;

    let payload = serde_json::json!({
        "client_info": { "name": "João da Silva", "phone": SEED_CLIENT_PHONE },
        "items": [
            { "product_id": burger, "quantity": 2 },
            { "product_id": coca, "quantity": 1 },
        ],
        "payment_method": "CASH",
        "change_for": 10000,
    });

    let (status, _, body) =
        call(&st, req("POST", "/orders", Some(&cookie), Some(payload.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);

    let order = parse_json(body);
    assert_eq!(order["status"], "AWAITING_PAYMENT");
    assert_eq!(order["order_number"], 1);
    // 2 × 1800 + 600, priced server-side.
    assert_eq!(order["total_amount"], 4200);
    assert_eq!(order["change_for"], 10000);
    assert_eq!(order["items"][0]["product_name"], "X-Burger", "name snapshotted");

    let (_, _, body) = call(&st, req("POST", "/orders", Some(&cookie), Some(payload))).await;
    assert_eq!(parse_json(body)["order_number"], 2, "numbers are sequential");
}

#[tokio::test]
async fn change_for_is_dropped_for_non_cash_payment() {
    let st = Arc::new(AppState::seeded());
    let cookie = client_session(&st).await;
    let burger = product_id(&st, "X-Burger").await;

    let (_, _, body) = call(
        &st,
        req(
            "POST",
            "/orders",
            Some(&cookie),
            Some(serde_json::json!({
                "client_info": { "name": "João", "phone": SEED_CLIENT_PHONE },
                "items": [ { "product_id": burger, "quantity": 1 } ],
                "payment_method": "PIX",
                "change_for": 5000,
            })),
        ),
    )
    .await;
    let order = parse_json(body);
    assert!(order.get("change_for").is_none(), "got: {order}");
}

#[tokio::test]
async fn inactive_product_is_refused_at_checkout() {
    let st = Arc::new(AppState::seeded());
    let cookie = client_session(&st).await;
    let pudim = product_id(&st, "Pudim").await;

    let (status, _, body) = call(
        &st,
        req(
            "POST",
            "/orders",
            Some(&cookie),
            Some(serde_json::json!({
                "client_info": { "name": "João", "phone": SEED_CLIENT_PHONE },
                "items": [ { "product_id": pudim, "quantity": 1 } ],
                "payment_method": "PIX",
                "change_for": null,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["error"], "product Pudim is not available");
}

// ---------------------------------------------------------------------------
// Queues and transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirm_payment_moves_order_between_queues() {
    let st = Arc::new(AppState::seeded());
    let (order, _) = place_burger_order(&st).await;
    let order_id = order["id"].as_str().expect("order id");
    let cashier = staff_session(&st, CASHIER_EMAIL, CASHIER_PASSWORD).await;

    let (_, _, body) = call(
        &st,
        req("GET", "/orders?status=AWAITING_PAYMENT", Some(&cashier), None),
    )
    .await;
    assert_eq!(parse_json(body).as_array().map(Vec::len), Some(1));

    let (status, _, body) = call(
        &st,
        req(
            "PATCH",
            &format!("/orders/{order_id}/confirm-payment"),
            Some(&cashier),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["status"], "AWAITING_DISPATCH");

    let (_, _, body) = call(
        &st,
        req("GET", "/orders?status=AWAITING_PAYMENT", Some(&cashier), None),
    )
    .await;
    assert_eq!(
        parse_json(body).as_array().map(Vec::len),
        Some(0),
        "confirmed order left the payment queue"
    );

    let (_, _, body) = call(
        &st,
        req("GET", "/orders?status=AWAITING_DISPATCH", Some(&cashier), None),
    )
    .await;
    assert_eq!(parse_json(body).as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn double_confirm_payment_is_409_with_machine_message() {
    let st = Arc::new(AppState::seeded());
    let (order, _) = place_burger_order(&st).await;
    let order_id = order["id"].as_str().expect("order id");
    let cashier = staff_session(&st, CASHIER_EMAIL, CASHIER_PASSWORD).await;
    let uri = format!("/orders/{order_id}/confirm-payment");

    let (status, _, _) = call(&st, req("PATCH", &uri, Some(&cashier), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = call(&st, req("PATCH", &uri, Some(&cashier), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let msg = parse_json(body)["error"].as_str().unwrap_or("").to_string();
    assert!(msg.contains("confirm-payment"), "got: {msg}");
    assert!(msg.contains("AWAITING_DISPATCH"), "got: {msg}");
}

#[tokio::test]
async fn dispatcher_cannot_confirm_payment() {
    let st = Arc::new(AppState::seeded());
    let (order, _) = place_burger_order(&st).await;
    let order_id = order["id"].as_str().expect("order id");
    let dispatcher = staff_session(&st, DISPATCHER_EMAIL, DISPATCHER_PASSWORD).await;

    let (status, _, body) = call(
        &st,
        req(
            "PATCH",
            &format!("/orders/{order_id}/confirm-payment"),
            Some(&dispatcher),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(parse_json(body)["error"], "missing required role");
}

#[tokio::test]
async fn cancel_is_admin_only() {
    let st = Arc::new(AppState::seeded());
    let (order, _) = place_burger_order(&st).await;
    let order_id = order["id"].as_str().expect("order id");
    let uri = format!("/orders/{order_id}/cancel");

    let cashier = staff_session(&st, CASHIER_EMAIL, CASHIER_PASSWORD).await;
    let (status, _, _) = call(&st, req("PATCH", &uri, Some(&cashier), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = staff_session(&st, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, _, body) = call(&st, req("PATCH", &uri, Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["status"], "CANCELLED");
}

#[tokio::test]
async fn admin_can_drive_the_full_pipeline() {
    let st = Arc::new(AppState::seeded());
    let (order, _) = place_burger_order(&st).await;
    let order_id = order["id"].as_str().expect("order id");
    let admin = staff_session(&st, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _, _) = call(
        &st,
        req("PATCH", &format!("/orders/{order_id}/confirm-payment"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = call(
        &st,
        req("PATCH", &format!("/orders/{order_id}/dispatch"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["status"], "DELIVERED");
}

#[tokio::test]
async fn queues_are_oldest_first_history_newest_first() {
    let st = Arc::new(AppState::seeded());
    let (_, cookie) = place_burger_order(&st).await;
    let burger = product_id(&st, "X-Burger").await;
    for _ in 0..2 {
        let (status, _, _) = call(
            &st,
            req(
                "POST",
                "/orders",
                Some(&cookie),
                Some(serde_json::json!({
                    "client_info": { "name": "João", "phone": SEED_CLIENT_PHONE },
                    "items": [ { "product_id": burger, "quantity": 1 } ],
                    "payment_method": "PIX",
                    "change_for": null,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let cashier = staff_session(&st, CASHIER_EMAIL, CASHIER_PASSWORD).await;
    let (_, _, body) = call(&st, req("GET", "/orders", Some(&cashier), None)).await;
    let numbers: Vec<i64> = parse_json(body)
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|o| o["order_number"].as_i64())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3], "staff queue is oldest first");

    let (_, _, body) = call(&st, req("GET", "/orders/my-orders", Some(&cookie), None)).await;
    let numbers: Vec<i64> = parse_json(body)
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|o| o["order_number"].as_i64())
        .collect();
    assert_eq!(numbers, vec![3, 2, 1], "client history is newest first");
}

#[tokio::test]
async fn staff_queue_is_refused_for_clients() {
    let st = Arc::new(AppState::seeded());
    let cookie = client_session(&st).await;

    let (status, _, _) = call(&st, req("GET", "/orders", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = call(&st, req("GET", "/orders", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_order_and_action_are_404() {
    let st = Arc::new(AppState::seeded());
    let admin = staff_session(&st, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _, _) = call(
        &st,
        req("PATCH", "/orders/nope/confirm-payment", Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = call(&st, req("PATCH", "/orders/nope/reheat", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Admin: products and users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_management_requires_admin() {
    let st = Arc::new(AppState::seeded());
    let cashier = staff_session(&st, CASHIER_EMAIL, CASHIER_PASSWORD).await;

    let new_product = serde_json::json!({
        "name": "Suco de Laranja",
        "description": "Copo 400ml",
        "price": 800,
        "category": "Bebidas",
    });

    let (status, _, _) = call(
        &st,
        req("POST", "/products", Some(&cashier), Some(new_product.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = staff_session(&st, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, _, body) =
        call(&st, req("POST", "/products", Some(&admin), Some(new_product))).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = parse_json(body);
    assert_eq!(created["is_active"], true);
    assert_eq!(created["stock"], 0);

    // Sold-out toggle via partial patch.
    let id = created["id"].as_str().expect("id");
    let (status, _, body) = call(
        &st,
        req(
            "PATCH",
            &format!("/products/{id}"),
            Some(&admin),
            Some(serde_json::json!({ "is_active": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let patched = parse_json(body);
    assert_eq!(patched["is_active"], false);
    assert_eq!(patched["price"], 800, "untouched fields survive the patch");
}

#[tokio::test]
async fn admin_replaces_roles_with_a_full_list() {
    let st = Arc::new(AppState::seeded());
    let admin = staff_session(&st, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _, body) = call(
        &st,
        req(
            "POST",
            "/users",
            Some(&admin),
            Some(serde_json::json!({
                "name": "Turno da Noite",
                "email": "turno@balcao.test",
                "password": "turno123",
                "roles": ["CASHIER"],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = parse_json(body)["id"].as_str().expect("id").to_string();

    let (status, _, body) = call(
        &st,
        req(
            "PATCH",
            &format!("/users/{user_id}"),
            Some(&admin),
            Some(serde_json::json!({ "roles": ["CASHIER", "DISPATCHER"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse_json(body)["roles"],
        serde_json::json!(["CASHIER", "DISPATCHER"])
    );

    let (_, _, body) = call(&st, req("GET", "/users", Some(&admin), None)).await;
    let users = parse_json(body);
    assert!(
        users
            .as_array()
            .expect("array")
            .iter()
            .any(|u| u["email"] == "turno@balcao.test"),
        "created user shows in the listing"
    );
}

#[tokio::test]
async fn duplicate_staff_email_is_409() {
    let st = Arc::new(AppState::seeded());
    let admin = staff_session(&st, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _, body) = call(
        &st,
        req(
            "POST",
            "/users",
            Some(&admin),
            Some(serde_json::json!({
                "name": "Impostor",
                "email": CASHIER_EMAIL,
                "password": "x",
                "roles": ["CASHIER"],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["error"], "email already registered");
}
