//! PostgreSQL-backed `OrderRepository` implementation using Diesel.
//!
//! Transitions follow the same conditional-update pattern as the offer
//! repository. `mark_paid` is additionally keyed on the checkout session id,
//! which makes payment verification idempotent at the row level.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderStatus, UserId};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewOrderRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::orders;

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> OrderRepositoryError {
    map_pool_error(error, OrderRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

fn decode(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    Order::try_from(row).map_err(|err| OrderRepositoryError::query(err.to_string()))
}

fn decode_optional(row: Option<OrderRow>) -> Result<Option<Order>, OrderRepositoryError> {
    row.map(decode).transpose()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(orders::table)
            .values(NewOrderRow::from_domain(order))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                if is_unique_violation(&error) {
                    OrderRepositoryError::duplicate_offer(order.offer_id)
                } else {
                    diesel_error(error)
                }
            })
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = orders::table
            .filter(orders::id.eq(order_id))
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = orders::table
            .filter(orders::payment_session_id.eq(session_id))
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let uuid = user_id.as_uuid();
        let rows = orders::table
            .filter(orders::buyer_id.eq(uuid).or(orders::seller_id.eq(uuid)))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load::<OrderRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(decode).collect()
    }

    async fn mark_paid(
        &self,
        session_id: &str,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = diesel::update(
            orders::table
                .filter(orders::payment_session_id.eq(session_id))
                .filter(orders::status.eq(OrderStatus::PendingPayment.as_str())),
        )
        .set((
            orders::status.eq(OrderStatus::Paid.as_str()),
            orders::payment_intent_id.eq(payment_intent_id),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OrderRow::as_returning())
        .get_result::<OrderRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn mark_shipped(
        &self,
        order_id: Uuid,
        tracking_number: Option<String>,
        notes: Option<String>,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = diesel::update(
            orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq(OrderStatus::Paid.as_str())),
        )
        .set((
            orders::status.eq(OrderStatus::Shipped.as_str()),
            orders::tracking_number.eq(tracking_number),
            orders::notes.eq(notes),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OrderRow::as_returning())
        .get_result::<OrderRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn mark_completed(
        &self,
        order_id: Uuid,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = diesel::update(
            orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq(OrderStatus::Shipped.as_str())),
        )
        .set((
            orders::status.eq(OrderStatus::Completed.as_str()),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OrderRow::as_returning())
        .get_result::<OrderRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        decode_optional(row)
    }

    async fn cancel(&self, order_id: Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let cancellable = OrderStatus::cancellable().map(|status| status.as_str());
        let row = diesel::update(
            orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq_any(cancellable)),
        )
        .set((
            orders::status.eq(OrderStatus::Cancelled.as_str()),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OrderRow::as_returning())
        .get_result::<OrderRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        decode_optional(row)
    }
}
