//! Payment settlement HTTP handlers.
//!
//! ```text
//! POST /api/v1/payments/create
//! POST /api/v1/payments/verify
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for opening a checkout session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequestBody {
    #[schema(format = "uuid")]
    pub offer_id: String,
}

/// An opened checkout session the buyer is redirected to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponseBody {
    pub session_id: String,
    pub url: String,
}

/// Request payload for verifying a checkout session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequestBody {
    pub session_id: String,
}

/// Verification outcome reported to the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponseBody {
    pub success: bool,
    #[schema(example = "paid")]
    pub status: String,
    #[schema(format = "uuid")]
    pub order_id: Option<Uuid>,
}

/// Open a checkout session for an accepted offer.
#[utoipa::path(
    post,
    path = "/api/v1/payments/create",
    request_body = CreateCheckoutRequestBody,
    responses(
        (status = 200, description = "Checkout session opened", body = CreateCheckoutResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the offer's buyer", body = Error),
        (status = 404, description = "Offer not found", body = Error),
        (status = 409, description = "Offer is not accepted", body = Error),
        (status = 502, description = "Payment processor failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "createCheckout",
    security(("SessionCookie" = []))
)]
#[post("/payments/create")]
pub async fn create_checkout(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCheckoutRequestBody>,
) -> ApiResult<web::Json<CreateCheckoutResponseBody>> {
    let buyer_id = session.require_user_id()?;
    let offer_id = parse_uuid(payload.into_inner().offer_id, FieldName::new("offerId"))?;

    let checkout = state.settlement.initiate_checkout(offer_id, buyer_id).await?;

    Ok(web::Json(CreateCheckoutResponseBody {
        session_id: checkout.id,
        url: checkout.url,
    }))
}

/// Verify a checkout session against the processor.
///
/// Safe to retry: re-verifying an already-paid session reports success
/// without re-applying side effects.
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body = VerifyPaymentRequestBody,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyPaymentResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Unknown session", body = Error),
        (status = 502, description = "Payment processor failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "verifyPayment",
    security(("SessionCookie" = []))
)]
#[post("/payments/verify")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyPaymentRequestBody>,
) -> ApiResult<web::Json<VerifyPaymentResponseBody>> {
    session.require_user_id()?;
    let body = payload.into_inner();

    let verification = state.settlement.verify_payment(&body.session_id).await?;

    Ok(web::Json(VerifyPaymentResponseBody {
        success: verification.success,
        status: verification.payment_status,
        order_id: verification.order.map(|order| order.id),
    }))
}

#[cfg(test)]
#[path = "payments_tests.rs"]
mod tests;
