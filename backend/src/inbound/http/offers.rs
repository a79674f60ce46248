//! Offer negotiation HTTP handlers.
//!
//! ```text
//! POST /api/v1/offers
//! GET  /api/v1/offers?role=buyer|seller
//! POST /api/v1/offers/{id}/respond
//! POST /api/v1/offers/{id}/counter-response
//! ```

use actix_web::{get, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CounterReply, CreateOfferRequest, Error, Offer, OfferResponse,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_choice_error, missing_field_error, parse_uuid,
};

/// Request payload for opening an offer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequestBody {
    #[schema(format = "uuid")]
    pub record_id: String,
    #[schema(value_type = String, example = "80.00")]
    pub amount: Decimal,
    pub message: Option<String>,
}

/// The seller's decision on an open offer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequestBody {
    /// One of `accept`, `deny` or `counter`.
    pub action: String,
    #[schema(value_type = Option<String>, example = "90.00")]
    pub counter_amount: Option<Decimal>,
    pub counter_message: Option<String>,
}

/// The buyer's reply to a standing counter-offer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterReplyRequestBody {
    /// One of `accept` or `decline`.
    pub action: String,
}

/// Query parameters scoping the offer list.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OfferListQuery {
    /// One of `buyer` or `seller`.
    pub role: String,
}

/// An offer as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponseBody {
    #[schema(format = "uuid")]
    pub id: Uuid,
    #[schema(format = "uuid")]
    pub record_id: Uuid,
    #[schema(format = "uuid")]
    pub buyer_id: Uuid,
    #[schema(format = "uuid")]
    pub seller_id: Uuid,
    #[schema(value_type = String, example = "80.00")]
    pub amount: Decimal,
    pub message: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(value_type = Option<String>, example = "90.00")]
    pub counter_amount: Option<Decimal>,
    pub counter_message: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Offer> for OfferResponseBody {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id,
            record_id: offer.record_id,
            buyer_id: *offer.buyer_id.as_uuid(),
            seller_id: *offer.seller_id.as_uuid(),
            amount: offer.amount,
            message: offer.message,
            status: offer.status.as_str().to_owned(),
            counter_amount: offer.counter_amount,
            counter_message: offer.counter_message,
            created_at: offer.created_at.to_rfc3339(),
            updated_at: offer.updated_at.to_rfc3339(),
        }
    }
}

fn parse_response(body: RespondRequestBody) -> Result<OfferResponse, Error> {
    match body.action.as_str() {
        "accept" => Ok(OfferResponse::Accept),
        "deny" => Ok(OfferResponse::Deny),
        "counter" => {
            let amount = body
                .counter_amount
                .ok_or_else(|| missing_field_error(FieldName::new("counterAmount")))?;
            Ok(OfferResponse::Counter {
                amount,
                message: body.counter_message,
            })
        }
        other => Err(invalid_choice_error(
            FieldName::new("action"),
            other,
            "accept, deny, counter",
        )),
    }
}

fn parse_counter_reply(body: CounterReplyRequestBody) -> Result<CounterReply, Error> {
    match body.action.as_str() {
        "accept" => Ok(CounterReply::Accept),
        "decline" => Ok(CounterReply::Decline),
        other => Err(invalid_choice_error(
            FieldName::new("action"),
            other,
            "accept, decline",
        )),
    }
}

/// Open a pending offer against a listing.
#[utoipa::path(
    post,
    path = "/api/v1/offers",
    request_body = CreateOfferRequestBody,
    responses(
        (status = 200, description = "Offer opened", body = OfferResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Listing not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["offers"],
    operation_id = "createOffer",
    security(("SessionCookie" = []))
)]
#[post("/offers")]
pub async fn create_offer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOfferRequestBody>,
) -> ApiResult<web::Json<OfferResponseBody>> {
    let buyer_id = session.require_user_id()?;
    let body = payload.into_inner();
    let record_id = parse_uuid(body.record_id, FieldName::new("recordId"))?;

    let offer = state
        .offers
        .create_offer(CreateOfferRequest {
            record_id,
            buyer_id,
            amount: body.amount,
            message: body.message,
        })
        .await?;

    Ok(web::Json(OfferResponseBody::from(offer)))
}

/// List offers where the authenticated user plays the given role.
#[utoipa::path(
    get,
    path = "/api/v1/offers",
    params(("role" = String, Query, description = "One of buyer or seller")),
    responses(
        (status = 200, description = "Scoped offers, newest first", body = [OfferResponseBody]),
        (status = 400, description = "Invalid role", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["offers"],
    operation_id = "listOffers",
    security(("SessionCookie" = []))
)]
#[get("/offers")]
pub async fn list_offers(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OfferListQuery>,
) -> ApiResult<web::Json<Vec<OfferResponseBody>>> {
    let user_id = session.require_user_id()?;

    let offers = match query.role.as_str() {
        "buyer" => state.offers.list_for_buyer(user_id).await?,
        "seller" => state.offers.list_for_seller(user_id).await?,
        other => {
            return Err(invalid_choice_error(
                FieldName::new("role"),
                other,
                "buyer, seller",
            ));
        }
    };

    Ok(web::Json(
        offers.into_iter().map(OfferResponseBody::from).collect(),
    ))
}

/// Apply the seller's accept/deny/counter decision to an open offer.
#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/respond",
    params(("id" = Uuid, Path, description = "Offer id")),
    request_body = RespondRequestBody,
    responses(
        (status = 200, description = "Updated offer", body = OfferResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the listing's seller", body = Error),
        (status = 404, description = "Offer not found", body = Error),
        (status = 409, description = "Offer no longer open", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["offers"],
    operation_id = "respondToOffer",
    security(("SessionCookie" = []))
)]
#[post("/offers/{id}/respond")]
pub async fn respond_to_offer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<RespondRequestBody>,
) -> ApiResult<web::Json<OfferResponseBody>> {
    let seller_id = session.require_user_id()?;
    let response = parse_response(payload.into_inner())?;

    let offer = state
        .offers
        .respond(path.into_inner(), seller_id, response)
        .await?;

    Ok(web::Json(OfferResponseBody::from(offer)))
}

/// Apply the buyer's accept/decline reply to a standing counter-offer.
#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/counter-response",
    params(("id" = Uuid, Path, description = "Offer id")),
    request_body = CounterReplyRequestBody,
    responses(
        (status = 200, description = "Updated offer", body = OfferResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the offer's buyer", body = Error),
        (status = 404, description = "Offer not found", body = Error),
        (status = 409, description = "No standing counter-offer", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["offers"],
    operation_id = "replyToCounter",
    security(("SessionCookie" = []))
)]
#[post("/offers/{id}/counter-response")]
pub async fn reply_to_counter(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CounterReplyRequestBody>,
) -> ApiResult<web::Json<OfferResponseBody>> {
    let buyer_id = session.require_user_id()?;
    let reply = parse_counter_reply(payload.into_inner())?;

    let offer = state
        .offers
        .counter_reply(path.into_inner(), buyer_id, reply)
        .await?;

    Ok(web::Json(OfferResponseBody::from(offer)))
}

#[cfg(test)]
#[path = "offers_tests.rs"]
mod tests;
