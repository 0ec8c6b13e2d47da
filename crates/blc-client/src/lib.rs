//! Async client for the collaborator order API.
//!
//! One [`ApiClient`] instance is one session: the underlying reqwest client
//! holds a cookie store, and the collaborator's session cookie set at login
//! rides along on every later call automatically. The live-channel consumer
//! (`blc-live`) borrows the same client so its subscription carries the same
//! credential.
//!
//! Surface split by concern: [`auth`], [`orders`], [`products`], [`users`]
//! each extend `ApiClient` with the calls for that slice of the contract.

mod auth;
mod error;
mod orders;
mod products;
mod users;

pub use error::ApiError;

use std::sync::Arc;

use reqwest::cookie::Jar;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client with a fresh in-memory cookie store. Any trailing
    /// slash on the base URL is trimmed; paths passed internally always
    /// start with `/`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_cookie_jar(base_url, Arc::new(Jar::default()))
    }

    /// Build a client over a caller-supplied cookie jar. This is how a
    /// session outlives one process: load the saved cookie into the jar
    /// before building, read it back out after the call.
    pub fn with_cookie_jar(base_url: impl Into<String>, jar: Arc<Jar>) -> Result<Self, ApiError> {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a long-lived SSE subscription at `path`. Status is checked
    /// before the body stream is handed back.
    pub async fn open_stream(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .http
            .get(self.url(path))
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(resp).await
    }

    // -----------------------------------------------------------------------
    // Plumbing shared by the per-concern modules
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode_json(resp).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode_json(resp).await
    }

    pub(crate) async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .http
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode_json(resp).await
    }

    /// POST with no body and no interesting response payload.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(resp).await.map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let resp = check_status(resp).await?;
    resp.json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map non-2xx statuses into the error taxonomy, pulling the collaborator's
/// message out of the body where it offers one.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::AuthRequired);
    }

    let message = refusal_message(resp, status).await;
    if status.is_client_error() {
        Err(ApiError::Refused {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// The collaborator reports refusals as `{"error": "..."}`; older revisions
/// used `{"message": "..."}`. Fall back to the status reason.
async fn refusal_message(resp: reqwest::Response, status: reqwest::StatusCode) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request refused")
            .to_string()
    };
    match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(fallback),
        Err(_) => fallback(),
    }
}
