//! Admin user management.

use blc_lifecycle::Role;
use blc_schemas::{NewUser, RolesPatch, SessionUser};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /users` (admin).
    pub async fn users(&self) -> Result<Vec<SessionUser>, ApiError> {
        self.get_json("/users").await
    }

    /// `POST /users` (admin): create a user with an initial role list.
    pub async fn create_user(&self, user: &NewUser) -> Result<SessionUser, ApiError> {
        self.post_json("/users", user).await
    }

    /// `PATCH /users/:id` (admin): full-replace role assignment. Toggling
    /// one role means sending the complete new list.
    pub async fn set_user_roles(
        &self,
        user_id: &str,
        roles: &[Role],
    ) -> Result<SessionUser, ApiError> {
        let patch = RolesPatch {
            roles: roles.to_vec(),
        };
        self.patch_json(&format!("/users/{user_id}"), &patch).await
    }
}
