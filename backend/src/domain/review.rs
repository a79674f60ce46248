//! Post-transaction reviews and rating aggregates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;

/// Inclusive rating bounds for every category.
pub const RATING_MIN: i16 = 1;
/// Inclusive rating bounds for every category.
pub const RATING_MAX: i16 = 5;

/// Which side of the transaction wrote the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerType {
    Buyer,
    Seller,
}

impl ReviewerType {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }
}

impl fmt::Display for ReviewerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when decoding an unknown reviewer type from the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reviewer type: {value}")]
pub struct UnknownReviewerType {
    /// The rejected raw value.
    pub value: String,
}

impl FromStr for ReviewerType {
    type Err = UnknownReviewerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(UnknownReviewerType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validation error for out-of-range ratings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} rating must be between {RATING_MIN} and {RATING_MAX}, got {value}")]
pub struct RatingOutOfRange {
    /// Which category failed validation.
    pub category: &'static str,
    /// The rejected value.
    pub value: i16,
}

/// The four mandatory rating categories, each 1–5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRatings {
    pub overall: i16,
    pub communication: i16,
    pub item_accuracy: i16,
    pub shipping: i16,
}

impl ReviewRatings {
    /// Validate all four categories into a ratings block.
    pub fn new(
        overall: i16,
        communication: i16,
        item_accuracy: i16,
        shipping: i16,
    ) -> Result<Self, RatingOutOfRange> {
        for (category, value) in [
            ("overall", overall),
            ("communication", communication),
            ("item_accuracy", item_accuracy),
            ("shipping", shipping),
        ] {
            if !(RATING_MIN..=RATING_MAX).contains(&value) {
                return Err(RatingOutOfRange { category, value });
            }
        }
        Ok(Self {
            overall,
            communication,
            item_accuracy,
            shipping,
        })
    }
}

/// A rating left by one transaction party about the other. Immutable once
/// created; at most one per (order, reviewer).
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub order_id: Uuid,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub reviewer_type: ReviewerType,
    pub ratings: ReviewRatings,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Build a fresh review.
    #[must_use]
    pub fn submit(
        order_id: Uuid,
        reviewer_id: UserId,
        reviewee_id: UserId,
        reviewer_type: ReviewerType,
        ratings: ReviewRatings,
        review_text: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            reviewer_id,
            reviewee_id,
            reviewer_type,
            ratings,
            review_text,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-category arithmetic means for one reviewee.
///
/// A user with zero reviews gets zero averages, never a division error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    #[schema(value_type = String, example = "4.5")]
    pub overall_avg: Decimal,
    #[schema(value_type = String, example = "4.0")]
    pub communication_avg: Decimal,
    #[schema(value_type = String, example = "5.0")]
    pub item_accuracy_avg: Decimal,
    #[schema(value_type = String, example = "4.5")]
    pub shipping_avg: Decimal,
    pub total_reviews: i64,
}

impl RatingStats {
    /// The well-defined zero result for a user with no reviews.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            overall_avg: Decimal::ZERO,
            communication_avg: Decimal::ZERO,
            item_accuracy_avg: Decimal::ZERO,
            shipping_avg: Decimal::ZERO,
            total_reviews: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn accepts_in_range_ratings() {
        let ratings = ReviewRatings::new(5, 4, 5, 3).expect("valid ratings");
        assert_eq!(ratings.overall, 5);
        assert_eq!(ratings.shipping, 3);
    }

    #[rstest]
    #[case(0, 4, 4, 4, "overall")]
    #[case(4, 6, 4, 4, "communication")]
    #[case(4, 4, -1, 4, "item_accuracy")]
    #[case(4, 4, 4, 12, "shipping")]
    fn rejects_out_of_range_ratings(
        #[case] overall: i16,
        #[case] communication: i16,
        #[case] item_accuracy: i16,
        #[case] shipping: i16,
        #[case] category: &str,
    ) {
        let err = ReviewRatings::new(overall, communication, item_accuracy, shipping)
            .expect_err("out of range rejected");
        assert_eq!(err.category, category);
    }

    #[rstest]
    fn empty_stats_are_all_zero() {
        let stats = RatingStats::empty();
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.overall_avg, Decimal::ZERO);
        assert_eq!(stats.shipping_avg, Decimal::ZERO);
    }
}
