//! Session and profile calls.
//!
//! The login-or-register fallback is deliberately NOT here: these are the
//! primitive calls, each mapping to exactly one endpoint. The checkout flow
//! composes the fallback in one place so the questionable
//! 401-means-unknown-user overload stays contained.

use blc_schemas::{ClientLogin, ProfilePatch, RegisterUser, SessionUser, StaffLogin};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /users/me`: the current session, or `AuthRequired`.
    pub async fn me(&self) -> Result<SessionUser, ApiError> {
        self.get_json("/users/me").await
    }

    /// `POST /auth/client-login`: phone + name. The collaborator answers
    /// 401 for unknown phones as well as bad sessions.
    pub async fn client_login(&self, login: &ClientLogin) -> Result<SessionUser, ApiError> {
        self.post_json("/auth/client-login", login).await
    }

    /// `POST /users/register`: create a client account.
    pub async fn register(&self, registration: &RegisterUser) -> Result<SessionUser, ApiError> {
        self.post_json("/users/register", registration).await
    }

    /// `POST /auth/login`: staff email + password.
    pub async fn staff_login(&self, login: &StaffLogin) -> Result<SessionUser, ApiError> {
        self.post_json("/auth/login", login).await
    }

    /// `POST /auth/logout`. Callers that want best-effort semantics ignore
    /// the result; the session cookie is dropped server-side on success.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty("/auth/logout").await
    }

    /// `PATCH /users/me`: update the client profile.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<SessionUser, ApiError> {
        self.patch_json("/users/me", patch).await
    }
}
