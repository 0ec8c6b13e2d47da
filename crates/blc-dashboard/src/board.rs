//! Staff order queues.
//!
//! An [`OrdersBoard`] is one operator's view of the order book: the cashier
//! queue, the dispatch queue, or the admin overview. The collaborator is the
//! source of truth; the board never mutates its own snapshot beyond
//! replacing it wholesale with a fresh listing. Every action goes through
//! the same shape: attempt the transition, then refetch regardless of the
//! outcome, so a lost race against another operator self-heals on screen.

use blc_client::{ApiClient, ApiError};
use blc_lifecycle::{OrderAction, OrderStatus, Role};
use blc_schemas::Order;

use crate::nav::{staff_landing, Route};

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Which slice of the order book a board watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardScope {
    /// Orders waiting for payment confirmation.
    Cashier,
    /// Paid orders waiting to go out the door.
    Dispatcher,
    /// The whole book, optionally narrowed to one status.
    Admin { filter: Option<OrderStatus> },
}

impl BoardScope {
    /// Roles that may open this board. The queue scopes reuse the permission
    /// sets of the action each queue exists to perform.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            BoardScope::Cashier => OrderAction::ConfirmPayment.permitted_roles(),
            BoardScope::Dispatcher => OrderAction::Dispatch.permitted_roles(),
            BoardScope::Admin { .. } => &[Role::Admin],
        }
    }

    /// Status filter this scope asks the collaborator for.
    pub fn filter(&self) -> Option<OrderStatus> {
        match self {
            BoardScope::Cashier => OrderAction::ConfirmPayment.source_status(),
            BoardScope::Dispatcher => OrderAction::Dispatch.source_status(),
            BoardScope::Admin { filter } => *filter,
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

pub struct OrdersBoard {
    client: ApiClient,
    scope: BoardScope,
    orders: Vec<Order>,
    last_error: Option<ApiError>,
}

impl OrdersBoard {
    /// Open a board after re-checking the session and role server-side,
    /// then load the initial snapshot. The collaborator gates the listing
    /// anyway; this guard exists so the shell can redirect before rendering
    /// an empty board. A signed-in operator who lacks the role is sent to
    /// their own landing; anyone without a session goes to the staff login.
    pub async fn open(client: ApiClient, scope: BoardScope) -> Result<OrdersBoard, Route> {
        match client.me().await {
            Ok(user)
                if scope
                    .allowed_roles()
                    .iter()
                    .any(|role| user.roles.contains(role)) => {}
            Ok(user) => return Err(staff_landing(&user.roles)),
            Err(err) => {
                tracing::debug!(error = %err, "board guard rejected the session");
                return Err(Route::StaffLogin);
            }
        }
        let mut board = OrdersBoard {
            client,
            scope,
            orders: Vec::new(),
            last_error: None,
        };
        board.refresh().await;
        Ok(board)
    }

    pub fn scope(&self) -> BoardScope {
        self.scope
    }

    /// The current snapshot, oldest order first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// The error from the most recent failed refresh, if the snapshot on
    /// screen is stale because of it.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Refetch the queue. On failure the previous snapshot stays on screen
    /// and the error is kept for inline display.
    pub async fn refresh(&mut self) {
        match self.client.orders(self.scope.filter()).await {
            Ok(orders) => {
                self.orders = orders;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "queue refresh failed, keeping stale snapshot");
                self.last_error = Some(err);
            }
        }
    }

    /// Apply a transition, then refetch no matter how it went. The refetch
    /// is what reconciles a lost race: if another operator got there first,
    /// the refused order has already left this queue by the time the error
    /// is on screen.
    pub async fn apply(&mut self, order_id: &str, action: OrderAction) -> Result<Order, ApiError> {
        let outcome = self.client.apply_order_action(order_id, action).await;
        self.refresh().await;
        outcome
    }

    pub async fn confirm_payment(&mut self, order_id: &str) -> Result<Order, ApiError> {
        self.apply(order_id, OrderAction::ConfirmPayment).await
    }

    pub async fn dispatch(&mut self, order_id: &str) -> Result<Order, ApiError> {
        self.apply(order_id, OrderAction::Dispatch).await
    }

    pub async fn cancel(&mut self, order_id: &str) -> Result<Order, ApiError> {
        self.apply(order_id, OrderAction::Cancel).await
    }

    /// Swap the admin overview onto another status and refetch. Ignored on
    /// the queue scopes, whose filter is fixed by the queue itself.
    pub async fn set_admin_filter(&mut self, filter: Option<OrderStatus>) {
        if let BoardScope::Admin { .. } = self.scope {
            self.scope = BoardScope::Admin { filter };
            self.refresh().await;
        }
    }
}
