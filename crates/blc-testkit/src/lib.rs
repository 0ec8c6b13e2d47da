//! Deterministic in-process fake of the counter's order API.
//!
//! Serves the real wire surface (REST + SSE) against an in-memory world so
//! consumer crates can run scenario tests without a network or the real
//! collaborator. Transition enforcement goes through the same
//! `blc_lifecycle` machine the boards use; the fake adds the HTTP taxonomy
//! around it (401 / 403 / 404 / 409) and the per-role live buses.
//!
//! Two ways in: drive the bare router with `tower::ServiceExt::oneshot`,
//! or bind a real listener on an ephemeral port with [`spawn`].

pub mod routes;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::{
    AppState, FakeUser, World, ADMIN_EMAIL, ADMIN_PASSWORD, CASHIER_EMAIL, CASHIER_PASSWORD,
    DISPATCHER_EMAIL, DISPATCHER_PASSWORD, SEED_CLIENT_NAME, SEED_CLIENT_PHONE, SESSION_COOKIE,
};

// ---------------------------------------------------------------------------
// Spawned server
// ---------------------------------------------------------------------------

/// A fake collaborator bound to an ephemeral local port.
///
/// Dropping the handle aborts the server task, so tests never leak
/// listeners.
pub struct TestServer {
    pub base_url: String,
    pub state: Arc<AppState>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Bind the seeded fake on `127.0.0.1:0` and serve it in the background.
pub async fn spawn() -> anyhow::Result<TestServer> {
    let state = Arc::new(AppState::seeded());
    let app = routes::build_router(Arc::clone(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_localhost_only());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind fake collaborator listener")?;
    let addr = listener.local_addr().context("listener local_addr")?;

    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://{addr}"),
        state,
        task,
    })
}

/// CORS: allow only localhost origins, like the real deployment.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(tower_http::cors::Any)
}
