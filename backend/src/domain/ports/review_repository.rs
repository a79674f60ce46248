//! Port for review persistence and rating aggregation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{RatingStats, Review, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review repository query failed: {message}",
        /// A review already exists for this (order, reviewer) pair.
        Duplicate { order_id: Uuid, reviewer_id: Uuid } =>
            "review already exists for order {order_id} by reviewer {reviewer_id}",
    }
}

/// Port for review persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Persist a review. The adapter maps a unique-index violation on
    /// (order, reviewer) to [`ReviewRepositoryError::Duplicate`].
    async fn insert(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Reviews written against one order.
    async fn list_for_order(&self, order_id: Uuid)
    -> Result<Vec<Review>, ReviewRepositoryError>;

    /// Aggregate per-category means and count for a reviewee. Must return
    /// [`RatingStats::empty`] when the user has no reviews.
    async fn rating_stats(&self, user_id: &UserId)
    -> Result<RatingStats, ReviewRepositoryError>;
}
