//! Order creation, queues, and status transitions.

use blc_lifecycle::{OrderAction, OrderStatus};
use blc_schemas::{NewOrder, Order};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// `POST /orders`: checkout. The collaborator assigns id and number,
    /// snapshots product names, and prices the total from the live catalog.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.post_json("/orders", order).await
    }

    /// `GET /orders` or `GET /orders?status=X`: the staff listing.
    pub async fn orders(&self, filter: Option<OrderStatus>) -> Result<Vec<Order>, ApiError> {
        match filter {
            Some(status) => {
                self.get_json(&format!("/orders?status={}", status.as_str()))
                    .await
            }
            None => self.get_json("/orders").await,
        }
    }

    /// `GET /orders/my-orders`: the calling client's own history.
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json("/orders/my-orders").await
    }

    /// `PATCH /orders/:id/<action>`: apply a status transition. A refused
    /// transition (already advanced, role gate) surfaces as
    /// [`ApiError::Refused`]; callers refetch either way.
    pub async fn apply_order_action(
        &self,
        order_id: &str,
        action: OrderAction,
    ) -> Result<Order, ApiError> {
        let path = format!("/orders/{order_id}/{}", action.as_str());
        self.patch_json(&path, &serde_json::json!({})).await
    }

    pub async fn confirm_payment(&self, order_id: &str) -> Result<Order, ApiError> {
        self.apply_order_action(order_id, OrderAction::ConfirmPayment)
            .await
    }

    pub async fn dispatch_order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.apply_order_action(order_id, OrderAction::Dispatch).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.apply_order_action(order_id, OrderAction::Cancel).await
    }
}
