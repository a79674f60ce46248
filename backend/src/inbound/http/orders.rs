//! Order fulfilment HTTP handlers.
//!
//! ```text
//! GET  /api/v1/orders
//! GET  /api/v1/orders/{id}
//! POST /api/v1/orders/{id}/ship
//! POST /api/v1/orders/{id}/complete
//! POST /api/v1/orders/{id}/cancel
//! ```

use actix_web::{get, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Order, ShipmentDetails};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Dispatch details recorded when marking an order shipped.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipRequestBody {
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

/// An order as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponseBody {
    #[schema(format = "uuid")]
    pub id: Uuid,
    #[schema(format = "uuid")]
    pub offer_id: Uuid,
    #[schema(format = "uuid")]
    pub record_id: Uuid,
    #[schema(format = "uuid")]
    pub buyer_id: Uuid,
    #[schema(format = "uuid")]
    pub seller_id: Uuid,
    #[schema(value_type = String, example = "100.00")]
    pub offer_amount: Decimal,
    #[schema(value_type = String, example = "4.00")]
    pub buyer_fee: Decimal,
    #[schema(value_type = String, example = "4.00")]
    pub seller_fee: Decimal,
    #[schema(value_type = String, example = "104.00")]
    pub total_amount: Decimal,
    #[schema(example = "paid")]
    pub status: String,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub shipping_address: Option<Value>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Order> for OrderResponseBody {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            offer_id: order.offer_id,
            record_id: order.record_id,
            buyer_id: *order.buyer_id.as_uuid(),
            seller_id: *order.seller_id.as_uuid(),
            offer_amount: order.offer_amount,
            buyer_fee: order.buyer_fee,
            seller_fee: order.seller_fee,
            total_amount: order.total_amount,
            status: order.status.as_str().to_owned(),
            tracking_number: order.tracking_number,
            notes: order.notes,
            shipping_address: order.shipping_address,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

/// List orders where the authenticated user is buyer or seller.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "The user's orders, newest first", body = [OrderResponseBody]),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders",
    security(("SessionCookie" = []))
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OrderResponseBody>>> {
    let user_id = session.require_user_id()?;
    let orders = state.orders.list_for_user(user_id).await?;
    Ok(web::Json(
        orders.into_iter().map(OrderResponseBody::from).collect(),
    ))
}

/// Fetch one order; only its buyer or seller may read it.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = OrderResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not a party to the order", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder",
    security(("SessionCookie" = []))
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderResponseBody>> {
    let user_id = session.require_user_id()?;
    let order = state.orders.get(path.into_inner(), user_id).await?;
    Ok(web::Json(OrderResponseBody::from(order)))
}

/// Record dispatch of a paid order.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/ship",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = ShipRequestBody,
    responses(
        (status = 200, description = "Shipped order", body = OrderResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the order's seller", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Order is not paid", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "shipOrder",
    security(("SessionCookie" = []))
)]
#[post("/orders/{id}/ship")]
pub async fn ship_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ShipRequestBody>,
) -> ApiResult<web::Json<OrderResponseBody>> {
    let seller_id = session.require_user_id()?;
    let body = payload.into_inner();

    let order = state
        .orders
        .mark_shipped(
            path.into_inner(),
            seller_id,
            ShipmentDetails {
                tracking_number: body.tracking_number,
                notes: body.notes,
            },
        )
        .await?;

    Ok(web::Json(OrderResponseBody::from(order)))
}

/// Close a shipped order, unlocking reviews.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/complete",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Completed order", body = OrderResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the order's seller", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Order is not shipped", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "completeOrder",
    security(("SessionCookie" = []))
)]
#[post("/orders/{id}/complete")]
pub async fn complete_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderResponseBody>> {
    let seller_id = session.require_user_id()?;
    let order = state
        .orders
        .mark_completed(path.into_inner(), seller_id)
        .await?;
    Ok(web::Json(OrderResponseBody::from(order)))
}

/// Cancel a non-terminal order.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancelled order", body = OrderResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the order's seller", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Order already settled", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder",
    security(("SessionCookie" = []))
)]
#[post("/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderResponseBody>> {
    let seller_id = session.require_user_id()?;
    let order = state.orders.cancel(path.into_inner(), seller_id).await?;
    Ok(web::Json(OrderResponseBody::from(order)))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
