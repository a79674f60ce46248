//! PostgreSQL-backed `ReviewRepository` implementation using Diesel.
//!
//! Review uniqueness is enforced by a unique index on (order_id,
//! reviewer_id); the insert maps that violation to the typed duplicate
//! error rather than pre-checking.

use async_trait::async_trait;
use diesel::dsl::avg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::money::round_money;
use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{RatingStats, Review, UserId};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

/// Diesel-backed implementation of the review repository port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ReviewRepositoryError {
    map_pool_error(error, ReviewRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

fn rounded(value: Option<Decimal>) -> Decimal {
    value.map(round_money).unwrap_or_default()
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::insert_into(reviews::table)
            .values(NewReviewRow::from_domain(review))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                if is_unique_violation(&error) {
                    ReviewRepositoryError::Duplicate {
                        order_id: review.order_id,
                        reviewer_id: *review.reviewer_id.as_uuid(),
                    }
                } else {
                    diesel_error(error)
                }
            })
    }

    async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = reviews::table
            .filter(reviews::order_id.eq(order_id))
            .order(reviews::created_at.asc())
            .select(ReviewRow::as_select())
            .load::<ReviewRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter()
            .map(|row| {
                Review::try_from(row).map_err(|err| ReviewRepositoryError::query(err.to_string()))
            })
            .collect()
    }

    async fn rating_stats(
        &self,
        user_id: &UserId,
    ) -> Result<RatingStats, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        type StatsRow = (
            Option<Decimal>,
            Option<Decimal>,
            Option<Decimal>,
            Option<Decimal>,
            i64,
        );

        let (overall, communication, item_accuracy, shipping, total): StatsRow = reviews::table
            .filter(reviews::reviewee_id.eq(user_id.as_uuid()))
            .select((
                avg(reviews::overall_rating),
                avg(reviews::communication_rating),
                avg(reviews::item_accuracy_rating),
                avg(reviews::shipping_rating),
                diesel::dsl::count_star(),
            ))
            .first::<StatsRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        if total == 0 {
            return Ok(RatingStats::empty());
        }

        Ok(RatingStats {
            overall_avg: rounded(overall),
            communication_avg: rounded(communication),
            item_accuracy_avg: rounded(item_accuracy),
            shipping_avg: rounded(shipping),
            total_reviews: total,
        })
    }
}
