//! Admin back office: catalog and staff roster.
//!
//! The [`AdminPanel`] covers the two admin surfaces that live outside the
//! order queues: product management (create, edit, the sold-out toggle) and
//! user management (create with roles, toggle a role on or off). It follows
//! the board discipline from [`crate::board`]: every write goes to the
//! collaborator, then the affected listing is refetched wholesale instead
//! of being patched in place.

use blc_client::{ApiClient, ApiError};
use blc_lifecycle::Role;
use blc_schemas::{NewProduct, NewUser, Product, ProductPatch, SessionUser};

use crate::nav::{staff_landing, Route};

pub struct AdminPanel {
    client: ApiClient,
    products: Vec<Product>,
    users: Vec<SessionUser>,
    last_error: Option<ApiError>,
}

impl AdminPanel {
    /// Open the panel for an ADMIN session and load both listings. The
    /// redirects mirror the boards: a signed-in operator without the role
    /// goes to their own landing, anyone else to the staff login.
    pub async fn open(client: ApiClient) -> Result<AdminPanel, Route> {
        match client.me().await {
            Ok(user) if user.roles.contains(&Role::Admin) => {}
            Ok(user) => return Err(staff_landing(&user.roles)),
            Err(err) => {
                tracing::debug!(error = %err, "admin guard rejected the session");
                return Err(Route::StaffLogin);
            }
        }
        let mut panel = AdminPanel {
            client,
            products: Vec::new(),
            users: Vec::new(),
            last_error: None,
        };
        panel.refresh().await;
        Ok(panel)
    }

    /// Catalog rows for the panel list. `active` narrows to available or
    /// sold-out products; `None` shows everything.
    pub fn products(&self, active: Option<bool>) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| active.map_or(true, |want| product.is_active == want))
            .collect()
    }

    /// The staff and client roster as the collaborator lists it.
    pub fn users(&self) -> &[SessionUser] {
        &self.users
    }

    /// The error from the most recent failed refresh, if a listing on
    /// screen is stale because of it.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Refetch both listings. A failed fetch keeps that listing stale and
    /// records the error for inline display.
    pub async fn refresh(&mut self) {
        self.last_error = None;
        match self.client.products().await {
            Ok(products) => self.products = products,
            Err(err) => {
                tracing::warn!(error = %err, "catalog refresh failed, keeping stale list");
                self.last_error = Some(err);
            }
        }
        match self.client.users().await {
            Ok(users) => self.users = users,
            Err(err) => {
                tracing::warn!(error = %err, "roster refresh failed, keeping stale list");
                self.last_error = Some(err);
            }
        }
    }

    pub async fn create_product(&mut self, product: &NewProduct) -> Result<Product, ApiError> {
        let outcome = self.client.create_product(product).await;
        self.refresh().await;
        outcome
    }

    /// Partial edit: price, stock, copy. Absent fields stay untouched.
    pub async fn update_product(
        &mut self,
        product_id: &str,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let outcome = self.client.update_product(product_id, patch).await;
        self.refresh().await;
        outcome
    }

    /// The sold-out switch: flip `is_active` on the row being rendered,
    /// leaving every other field alone.
    pub async fn toggle_availability(&mut self, product: &Product) -> Result<Product, ApiError> {
        let patch = ProductPatch {
            is_active: Some(!product.is_active),
            ..ProductPatch::default()
        };
        self.update_product(&product.id, &patch).await
    }

    pub async fn create_user(&mut self, user: &NewUser) -> Result<SessionUser, ApiError> {
        let outcome = self.client.create_user(user).await;
        self.refresh().await;
        outcome
    }

    /// Toggle one role on a roster row. The wire shape is a full replace,
    /// so the new list is computed here from the row being rendered.
    pub async fn toggle_role(
        &mut self,
        user: &SessionUser,
        role: Role,
    ) -> Result<SessionUser, ApiError> {
        let mut roles = user.roles.clone();
        match roles.iter().position(|have| *have == role) {
            Some(at) => {
                roles.remove(at);
            }
            None => roles.push(role),
        }
        let outcome = self.client.set_user_roles(&user.id, &roles).await;
        self.refresh().await;
        outcome
    }
}
