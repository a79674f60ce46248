//! Order fulfilment domain service.
//!
//! Covers the post-payment half of the purchase lifecycle: shipping,
//! completion and cancellation. Transitions go through the repository's
//! compare-and-set methods; payment confirmation itself lives in the
//! settlement service.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{EventPublisher, OrderRepository, OrderRepositoryError};
use crate::domain::{ChangeEvent, ChangedTable, Error, Order, UserId};

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
        OrderRepositoryError::DuplicateOffer { offer_id } => Error::conflict(format!(
            "checkout is already in progress for offer {offer_id}"
        )),
    }
}

/// Seller-supplied shipping details.
#[derive(Debug, Clone, Default)]
pub struct ShipmentDetails {
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

/// Driving port for order fulfilment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderFulfilment: Send + Sync {
    /// Fetch a single order; only its buyer or seller may read it.
    async fn get(&self, order_id: Uuid, acting_user: UserId) -> Result<Order, Error>;

    /// Orders where the user is buyer or seller, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, Error>;

    /// Record dispatch: `paid → shipped`. Seller only.
    async fn mark_shipped(
        &self,
        order_id: Uuid,
        acting_seller: UserId,
        details: ShipmentDetails,
    ) -> Result<Order, Error>;

    /// Close the order: `shipped → completed`. Seller only; unlocks reviews.
    async fn mark_completed(&self, order_id: Uuid, acting_seller: UserId) -> Result<Order, Error>;

    /// Cancel from any non-terminal state. Seller only.
    async fn cancel(&self, order_id: Uuid, acting_seller: UserId) -> Result<Order, Error>;
}

/// Order fulfilment service over the order port.
pub struct OrderFulfilmentService<O> {
    orders: Arc<O>,
    events: Arc<dyn EventPublisher>,
}

impl<O> OrderFulfilmentService<O> {
    /// Create the service with its driven ports.
    pub fn new(orders: Arc<O>, events: Arc<dyn EventPublisher>) -> Self {
        Self { orders, events }
    }
}

impl<O> OrderFulfilmentService<O>
where
    O: OrderRepository,
{
    async fn load(&self, order_id: Uuid) -> Result<Order, Error> {
        self.orders
            .find_by_id(order_id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {order_id} not found")))
    }

    /// Load the order and check the acting user is its seller.
    async fn load_for_seller(&self, order_id: Uuid, acting_seller: UserId) -> Result<Order, Error> {
        let order = self.load(order_id).await?;
        if order.seller_id != acting_seller {
            return Err(Error::forbidden(
                "only the order's seller may perform this action",
            ));
        }
        Ok(order)
    }

    /// Translate a compare-and-set miss into not-found or invalid-state by
    /// re-reading the authoritative row.
    async fn explain_transition_miss(&self, order_id: Uuid) -> Error {
        match self.orders.find_by_id(order_id).await {
            Ok(Some(order)) => Error::invalid_state(format!(
                "order {order_id} is {}, transition not permitted",
                order.status
            )),
            Ok(None) => Error::not_found(format!("order {order_id} not found")),
            Err(error) => map_order_error(error),
        }
    }

    fn announce(&self, order_id: Uuid) {
        self.events
            .publish(ChangeEvent::new(ChangedTable::Orders, order_id));
    }
}

#[async_trait]
impl<O> OrderFulfilment for OrderFulfilmentService<O>
where
    O: OrderRepository,
{
    async fn get(&self, order_id: Uuid, acting_user: UserId) -> Result<Order, Error> {
        let order = self.load(order_id).await?;
        if order.buyer_id != acting_user && order.seller_id != acting_user {
            return Err(Error::forbidden("you are not a party to this order"));
        }
        Ok(order)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_user(&user_id)
            .await
            .map_err(map_order_error)
    }

    async fn mark_shipped(
        &self,
        order_id: Uuid,
        acting_seller: UserId,
        details: ShipmentDetails,
    ) -> Result<Order, Error> {
        self.load_for_seller(order_id, acting_seller).await?;

        let Some(updated) = self
            .orders
            .mark_shipped(order_id, details.tracking_number, details.notes)
            .await
            .map_err(map_order_error)?
        else {
            return Err(self.explain_transition_miss(order_id).await);
        };

        tracing::info!(order_id = %order_id, "order shipped");
        self.announce(order_id);
        Ok(updated)
    }

    async fn mark_completed(&self, order_id: Uuid, acting_seller: UserId) -> Result<Order, Error> {
        self.load_for_seller(order_id, acting_seller).await?;

        let Some(updated) = self
            .orders
            .mark_completed(order_id)
            .await
            .map_err(map_order_error)?
        else {
            return Err(self.explain_transition_miss(order_id).await);
        };

        tracing::info!(order_id = %order_id, "order completed");
        self.announce(order_id);
        Ok(updated)
    }

    async fn cancel(&self, order_id: Uuid, acting_seller: UserId) -> Result<Order, Error> {
        self.load_for_seller(order_id, acting_seller).await?;

        let Some(updated) = self
            .orders
            .cancel(order_id)
            .await
            .map_err(map_order_error)?
        else {
            return Err(self.explain_transition_miss(order_id).await);
        };

        tracing::info!(order_id = %order_id, "order cancelled");
        self.announce(order_id);
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
