//! The client purchase flow: browse, sign in, check out.
//!
//! [`ClientFlow`] ties the on-disk cart to the collaborator session and
//! carries the one piece of navigation state the flow needs: where the
//! client was headed when a missing session diverted them to login. The
//! collaborator stays authoritative for identity and pricing; the flow only
//! sends product ids and quantities and lets the catalog price them.

use std::fmt;
use std::path::Path;

use blc_cart::{CartStore, PricedLine};
use blc_client::{ApiClient, ApiError};
use blc_lifecycle::{validate_client_identity, IdentityError, PaymentMethod};
use blc_schemas::{
    ClientLogin, ClientRef, NewOrder, Order, Product, ProfilePatch, RegisterUser, SessionUser,
};

use crate::nav::Route;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum FlowError {
    /// Identity rejected locally, before any network traffic.
    Invalid(IdentityError),
    /// Checkout attempted with nothing submittable in the cart.
    EmptyCart,
    /// The collaborator refused or failed.
    Api(ApiError),
    /// The on-disk cart could not be read or written.
    Cart(anyhow::Error),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::EmptyCart => write!(f, "cart is empty"),
            Self::Api(err) => write!(f, "{err}"),
            Self::Cart(err) => write!(f, "cart storage error: {err}"),
        }
    }
}

impl std::error::Error for FlowError {}

impl From<IdentityError> for FlowError {
    fn from(err: IdentityError) -> Self {
        Self::Invalid(err)
    }
}

impl From<ApiError> for FlowError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

pub struct ClientFlow {
    client: ApiClient,
    cart: CartStore,
    next_path: Option<Route>,
}

impl ClientFlow {
    /// Open the flow over a session client and the cart stored under
    /// `data_dir`.
    pub fn open(client: ApiClient, data_dir: &Path) -> Result<ClientFlow, FlowError> {
        let cart = CartStore::open(data_dir).map_err(FlowError::Cart)?;
        Ok(ClientFlow {
            client,
            cart,
            next_path: None,
        })
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Gate for session-only screens. A destination that needs a client
    /// session and finds none is remembered, and the client is diverted to
    /// the login screen; a later [`resume`](Self::resume) consumes the
    /// memory. Everything else passes straight through.
    pub async fn guard(&mut self, destination: Route) -> Route {
        if !destination.requires_client_session() {
            return destination;
        }
        match self.client.me().await {
            Ok(_) => destination,
            Err(err) => {
                tracing::debug!(error = %err, "no client session, diverting to login");
                self.next_path = Some(destination);
                Route::ClientLogin
            }
        }
    }

    /// Where to go after a successful login: the remembered destination if
    /// one was recorded, otherwise checkout when the cart already holds
    /// items, otherwise the menu. The memory is consumed either way.
    pub fn resume(&mut self) -> Route {
        if let Some(route) = self.next_path.take() {
            return route;
        }
        if self.cart.is_empty() {
            Route::Menu
        } else {
            Route::Checkout
        }
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Sign in by phone, registering on the fly when the phone is unknown.
    /// Identity is validated locally first so a bad phone never reaches the
    /// wire.
    pub async fn login(&mut self, name: &str, phone: &str) -> Result<SessionUser, FlowError> {
        let normalized = validate_client_identity(name, phone)?;
        let login = ClientLogin {
            phone: normalized.clone(),
            name: name.trim().to_string(),
        };
        match self.client.client_login(&login).await {
            Ok(user) => Ok(user),
            Err(ApiError::AuthRequired) => {
                tracing::debug!(phone = %normalized, "unknown client, registering");
                self.client
                    .register(&RegisterUser {
                        phone: normalized,
                        name: name.trim().to_string(),
                    })
                    .await?;
                Ok(self.client.client_login(&login).await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn profile(&self) -> Result<SessionUser, FlowError> {
        Ok(self.client.me().await?)
    }

    /// Update the signed-in client's name and phone, validating locally
    /// first.
    pub async fn update_profile(&self, name: &str, phone: &str) -> Result<SessionUser, FlowError> {
        let normalized = validate_client_identity(name, phone)?;
        let patch = ProfilePatch {
            name: name.trim().to_string(),
            phone: normalized,
        };
        Ok(self.client.update_profile(&patch).await?)
    }

    /// End the client session and clear the local cart. A failed remote
    /// logout is logged and otherwise ignored; a cart that cannot be
    /// cleared is a local fault and does propagate.
    pub async fn logout(&mut self) -> Result<Route, FlowError> {
        if let Err(err) = self.client.logout().await {
            tracing::warn!(error = %err, "remote logout failed, dropping session locally");
        }
        self.cart.clear().map_err(FlowError::Cart)?;
        Ok(Route::Landing)
    }

    // -----------------------------------------------------------------------
    // Browsing
    // -----------------------------------------------------------------------

    /// The browsable menu: active products only.
    pub async fn menu(&self) -> Result<Vec<Product>, FlowError> {
        let products = self.client.products().await?;
        Ok(products.into_iter().filter(|p| p.is_active).collect())
    }

    /// Cart lines priced against the live catalog, with the running total.
    pub async fn cart_view(&self) -> Result<(Vec<PricedLine>, i64), FlowError> {
        let catalog = self.client.products().await?;
        let lines = self.cart.resolve(&catalog);
        let total = self.cart.total_cents(&catalog);
        Ok((lines, total))
    }

    /// The signed-in client's own orders, newest first.
    pub async fn order_history(&self) -> Result<Vec<Order>, FlowError> {
        Ok(self.client.my_orders().await?)
    }

    // -----------------------------------------------------------------------
    // Checkout
    // -----------------------------------------------------------------------

    /// Place the order. Identity comes from the session, items from the
    /// cart as id and quantity only, and `change_for` is dropped unless the
    /// payment method takes change. The cart is cleared only after the
    /// collaborator accepts; a refused checkout leaves it intact so the
    /// client can fix the problem and retry.
    pub async fn submit_order(
        &mut self,
        payment_method: PaymentMethod,
        change_for: Option<i64>,
    ) -> Result<Order, FlowError> {
        if self.cart.is_empty() {
            return Err(FlowError::EmptyCart);
        }
        let user = self.client.me().await?;
        let catalog = self.client.products().await?;
        let items = self.cart.checkout_items(&catalog);
        if items.is_empty() {
            // Every cart line pointed at a product the catalog no longer has.
            return Err(FlowError::EmptyCart);
        }
        let order = self
            .client
            .create_order(&NewOrder {
                client_info: ClientRef {
                    name: user.name.clone(),
                    phone: user.phone.clone().unwrap_or_default(),
                },
                items,
                payment_method,
                change_for: change_for.filter(|_| payment_method.takes_change_for()),
            })
            .await?;
        if let Err(err) = self.cart.clear() {
            tracing::warn!(error = %err, "order placed but cart file not cleared");
        }
        Ok(order)
    }
}
