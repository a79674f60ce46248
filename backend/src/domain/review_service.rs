//! Review ledger domain service.
//!
//! Reviews unlock when an order completes. Each party may leave exactly one
//! review per order; the uniqueness guarantee lives in the store (unique
//! index), with the adapter surfacing violations as a typed duplicate error.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order_service::map_order_error;
use crate::domain::ports::{
    EventPublisher, OrderRepository, ReviewRepository, ReviewRepositoryError,
};
use crate::domain::{
    ChangeEvent, ChangedTable, Error, OrderStatus, RatingStats, Review, ReviewRatings,
    ReviewerType, UserId,
};

fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewRepositoryError::Duplicate { order_id, .. } => Error::conflict(format!(
            "you have already reviewed order {order_id}"
        )),
    }
}

/// Request payload for submitting a review.
#[derive(Debug, Clone)]
pub struct SubmitReviewRequest {
    pub order_id: Uuid,
    pub reviewer_id: UserId,
    pub ratings: ReviewRatings,
    pub review_text: Option<String>,
}

/// Driving port for the review ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewLedger: Send + Sync {
    /// Submit a review against a completed order. The reviewer must be the
    /// order's buyer or seller; the counterparty becomes the reviewee.
    async fn submit_review(&self, request: SubmitReviewRequest) -> Result<Review, Error>;

    /// Reviews written against one order.
    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Review>, Error>;

    /// Per-category rating means and review count for a user.
    async fn rating_stats(&self, user_id: UserId) -> Result<RatingStats, Error>;
}

/// Review ledger service over the review and order ports.
pub struct ReviewLedgerService<R, O> {
    reviews: Arc<R>,
    orders: Arc<O>,
    events: Arc<dyn EventPublisher>,
}

impl<R, O> ReviewLedgerService<R, O> {
    /// Create the service with its driven ports.
    pub fn new(reviews: Arc<R>, orders: Arc<O>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            reviews,
            orders,
            events,
        }
    }
}

#[async_trait]
impl<R, O> ReviewLedger for ReviewLedgerService<R, O>
where
    R: ReviewRepository,
    O: OrderRepository,
{
    async fn submit_review(&self, request: SubmitReviewRequest) -> Result<Review, Error> {
        let order = self
            .orders
            .find_by_id(request.order_id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {} not found", request.order_id)))?;

        let (reviewer_type, reviewee_id) = if request.reviewer_id == order.buyer_id {
            (ReviewerType::Buyer, order.seller_id)
        } else if request.reviewer_id == order.seller_id {
            (ReviewerType::Seller, order.buyer_id)
        } else {
            return Err(Error::forbidden("you are not a party to this order"));
        };

        if order.status != OrderStatus::Completed {
            return Err(Error::invalid_state(format!(
                "order {} is {}, reviews unlock on completion",
                order.id, order.status
            )));
        }

        let review = Review::submit(
            order.id,
            request.reviewer_id,
            reviewee_id,
            reviewer_type,
            request.ratings,
            request.review_text,
        );
        self.reviews
            .insert(&review)
            .await
            .map_err(map_review_error)?;

        tracing::info!(
            review_id = %review.id,
            order_id = %order.id,
            reviewer_type = %reviewer_type,
            "review submitted"
        );
        self.events
            .publish(ChangeEvent::new(ChangedTable::Reviews, review.id));
        Ok(review)
    }

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Review>, Error> {
        self.reviews
            .list_for_order(order_id)
            .await
            .map_err(map_review_error)
    }

    async fn rating_stats(&self, user_id: UserId) -> Result<RatingStats, Error> {
        self.reviews
            .rating_stats(&user_id)
            .await
            .map_err(map_review_error)
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
