//! Review ledger HTTP handlers.
//!
//! ```text
//! POST /api/v1/reviews
//! GET  /api/v1/orders/{id}/reviews
//! GET  /api/v1/users/{id}/rating-stats
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Error, RatingStats, Review, ReviewRatings, SubmitReviewRequest, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for submitting a review.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequestBody {
    #[schema(format = "uuid")]
    pub order_id: String,
    #[schema(minimum = 1, maximum = 5)]
    pub overall: i16,
    #[schema(minimum = 1, maximum = 5)]
    pub communication: i16,
    #[schema(minimum = 1, maximum = 5)]
    pub item_accuracy: i16,
    #[schema(minimum = 1, maximum = 5)]
    pub shipping: i16,
    pub review_text: Option<String>,
}

/// A review as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponseBody {
    #[schema(format = "uuid")]
    pub id: Uuid,
    #[schema(format = "uuid")]
    pub order_id: Uuid,
    #[schema(format = "uuid")]
    pub reviewer_id: Uuid,
    #[schema(format = "uuid")]
    pub reviewee_id: Uuid,
    #[schema(example = "buyer")]
    pub reviewer_type: String,
    pub ratings: ReviewRatings,
    pub review_text: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Review> for ReviewResponseBody {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            order_id: review.order_id,
            reviewer_id: *review.reviewer_id.as_uuid(),
            reviewee_id: *review.reviewee_id.as_uuid(),
            reviewer_type: review.reviewer_type.as_str().to_owned(),
            ratings: review.ratings,
            review_text: review.review_text,
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

fn parse_ratings(body: &SubmitReviewRequestBody) -> Result<ReviewRatings, Error> {
    ReviewRatings::new(
        body.overall,
        body.communication,
        body.item_accuracy,
        body.shipping,
    )
    .map_err(|error| {
        Error::invalid_request(error.to_string()).with_details(json!({
            "field": error.category,
            "value": error.value,
            "code": "rating_out_of_range",
        }))
    })
}

/// Submit a review against a completed order.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = SubmitReviewRequestBody,
    responses(
        (status = 200, description = "Review recorded", body = ReviewResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not a party to the order", body = Error),
        (status = 404, description = "Order not found", body = Error),
        (status = 409, description = "Order not completed, or already reviewed", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "submitReview",
    security(("SessionCookie" = []))
)]
#[post("/reviews")]
pub async fn submit_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitReviewRequestBody>,
) -> ApiResult<web::Json<ReviewResponseBody>> {
    let reviewer_id = session.require_user_id()?;
    let body = payload.into_inner();
    let ratings = parse_ratings(&body)?;
    let order_id = parse_uuid(body.order_id, FieldName::new("orderId"))?;

    let review = state
        .reviews
        .submit_review(SubmitReviewRequest {
            order_id,
            reviewer_id,
            ratings,
            review_text: body.review_text,
        })
        .await?;

    Ok(web::Json(ReviewResponseBody::from(review)))
}

/// Reviews written against one order.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/reviews",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Reviews for the order", body = [ReviewResponseBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listOrderReviews"
)]
#[get("/orders/{id}/reviews")]
pub async fn list_order_reviews(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<ReviewResponseBody>>> {
    let reviews = state.reviews.list_for_order(path.into_inner()).await?;
    Ok(web::Json(
        reviews.into_iter().map(ReviewResponseBody::from).collect(),
    ))
}

/// Aggregate rating statistics for a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/rating-stats",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Per-category means and review count", body = RatingStats),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getRatingStats"
)]
#[get("/users/{id}/rating-stats")]
pub async fn get_rating_stats(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<RatingStats>> {
    let stats = state
        .reviews
        .rating_stats(UserId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(stats))
}

#[cfg(test)]
#[path = "reviews_tests.rs"]
mod tests;
