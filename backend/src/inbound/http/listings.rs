//! Listing catalogue HTTP handlers.
//!
//! ```text
//! POST   /api/v1/listings
//! GET    /api/v1/listings
//! GET    /api/v1/listings/{id}
//! DELETE /api/v1/listings/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{CreateListingRequest, Error, Listing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload for publishing a listing.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequestBody {
    pub album_name: String,
    pub artist: String,
    pub condition: String,
    #[schema(value_type = String, example = "120.00")]
    pub price: Decimal,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
}

/// A listing as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponseBody {
    #[schema(format = "uuid")]
    pub id: Uuid,
    #[schema(format = "uuid")]
    pub seller_id: Uuid,
    pub album_name: String,
    pub artist: String,
    pub condition: String,
    #[schema(value_type = String, example = "120.00")]
    pub price: Decimal,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Listing> for ListingResponseBody {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id(),
            seller_id: *listing.seller_id().as_uuid(),
            album_name: listing.album_name().to_owned(),
            artist: listing.artist().to_owned(),
            condition: listing.condition().to_owned(),
            price: listing.price(),
            images: listing.images().to_vec(),
            description: listing.description().map(str::to_owned),
            genre: listing.genre().map(str::to_owned),
            release_year: listing.release_year(),
            created_at: listing.created_at().to_rfc3339(),
            updated_at: listing.updated_at().to_rfc3339(),
        }
    }
}

/// Publish a new listing owned by the authenticated seller.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    request_body = CreateListingRequestBody,
    responses(
        (status = 200, description = "Listing published", body = ListingResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["listings"],
    operation_id = "createListing",
    security(("SessionCookie" = []))
)]
#[post("/listings")]
pub async fn create_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListingRequestBody>,
) -> ApiResult<web::Json<ListingResponseBody>> {
    let seller_id = session.require_user_id()?;
    let body = payload.into_inner();

    let listing = state
        .listings
        .create_listing(CreateListingRequest {
            seller_id,
            album_name: body.album_name,
            artist: body.artist,
            condition: body.condition,
            price: body.price,
            images: body.images,
            description: body.description,
            genre: body.genre,
            release_year: body.release_year,
        })
        .await?;

    Ok(web::Json(ListingResponseBody::from(listing)))
}

/// Browse the most recent listings.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    responses(
        (status = 200, description = "Recent listings", body = [ListingResponseBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["listings"],
    operation_id = "browseListings"
)]
#[get("/listings")]
pub async fn browse_listings(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ListingResponseBody>>> {
    let listings = state.listings.browse().await?;
    Ok(web::Json(
        listings.into_iter().map(ListingResponseBody::from).collect(),
    ))
}

/// Fetch one listing.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "The listing", body = ListingResponseBody),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["listings"],
    operation_id = "getListing"
)]
#[get("/listings/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ListingResponseBody>> {
    let listing = state.listings.get(path.into_inner()).await?;
    Ok(web::Json(ListingResponseBody::from(listing)))
}

/// Delete an unsold listing owned by the authenticated seller.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Listing already sold", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["listings"],
    operation_id = "deleteListing",
    security(("SessionCookie" = []))
)]
#[delete("/listings/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let seller_id = session.require_user_id()?;
    state
        .listings
        .delete_listing(path.into_inner(), seller_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
