//! Route table and role-gated landing resolution.
//!
//! Every screen the operator surface knows about is a [`Route`]. Paths are
//! stable strings so they can round-trip through history stacks and logs.
//! Unknown paths deliberately fall back to [`Route::Landing`] instead of
//! erroring: a stale bookmark should land somewhere useful.

use blc_client::ApiClient;
use blc_lifecycle::{primary_staff_role, Role};

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Menu,
    CartView,
    ClientLogin,
    Profile,
    OrdersHistory,
    Checkout,
    OrderSuccess,
    StaffLogin,
    Cashier,
    Dispatcher,
    Admin,
    AdminOrders,
    AdminProducts,
    AdminUsers,
}

impl Route {
    pub const ALL: [Route; 15] = [
        Route::Landing,
        Route::Menu,
        Route::CartView,
        Route::ClientLogin,
        Route::Profile,
        Route::OrdersHistory,
        Route::Checkout,
        Route::OrderSuccess,
        Route::StaffLogin,
        Route::Cashier,
        Route::Dispatcher,
        Route::Admin,
        Route::AdminOrders,
        Route::AdminProducts,
        Route::AdminUsers,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Menu => "/menu",
            Route::CartView => "/cart",
            Route::ClientLogin => "/login",
            Route::Profile => "/profile",
            Route::OrdersHistory => "/my-orders",
            Route::Checkout => "/checkout",
            Route::OrderSuccess => "/order-success",
            Route::StaffLogin => "/staff/login",
            Route::Cashier => "/staff/cashier",
            Route::Dispatcher => "/staff/dispatcher",
            Route::Admin => "/staff/admin",
            Route::AdminOrders => "/staff/admin/orders",
            Route::AdminProducts => "/staff/admin/products",
            Route::AdminUsers => "/staff/admin/users",
        }
    }

    /// Unknown paths resolve to the landing screen rather than an error.
    pub fn from_path(path: &str) -> Route {
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Route::Landing)
    }

    /// Screens that demand a client session before rendering. Everything
    /// else on the client side is browsable anonymously; the cart lives on
    /// disk and the menu is public.
    pub fn requires_client_session(&self) -> bool {
        matches!(self, Route::Checkout | Route::Profile)
    }
}

// ---------------------------------------------------------------------------
// Staff landing
// ---------------------------------------------------------------------------

/// Pick the staff home screen for a role set. Admin outranks cashier
/// outranks dispatcher; a user with no staff role has no business past the
/// staff login.
pub fn staff_landing(roles: &[Role]) -> Route {
    match primary_staff_role(roles) {
        Some(Role::Admin) => Route::Admin,
        Some(Role::Cashier) => Route::Cashier,
        Some(Role::Dispatcher) => Route::Dispatcher,
        _ => Route::StaffLogin,
    }
}

/// Ask the collaborator who is calling and route them home. Any failure,
/// including a missing session, lands on the staff login.
pub async fn resolve_staff_landing(client: &ApiClient) -> Route {
    match client.me().await {
        Ok(user) => staff_landing(&user.roles),
        Err(err) => {
            tracing::debug!(error = %err, "staff landing probe failed");
            Route::StaffLogin
        }
    }
}

/// End the staff session. A failed remote logout is logged and otherwise
/// ignored: the operator is leaving either way.
pub async fn staff_logout(client: &ApiClient) -> Route {
    if let Err(err) = client.logout().await {
        tracing::warn!(error = %err, "remote logout failed, dropping session locally");
    }
    Route::StaffLogin
}
