//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain. Reads convert into domain types through the
//! validated constructors; a row that fails validation is a corrupt row and
//! surfaces as a decode error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Listing, ListingDraft, Offer, OfferStatus, Order, OrderStatus, Profile, Review, ReviewRatings,
    ReviewerType, UserId,
};

use super::schema::{offers, orders, profiles, reviews, vinyl_records};

/// A stored row that cannot be decoded into its domain type.
#[derive(Debug, Clone, thiserror::Error)]
#[error("corrupt row: {reason}")]
pub(crate) struct RowDecodeError {
    reason: String,
}

impl RowDecodeError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Vinyl record models
// ---------------------------------------------------------------------------

/// Row struct for reading from the vinyl_records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vinyl_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VinylRecordRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub album_name: String,
    pub artist: String,
    pub condition: String,
    pub price: Decimal,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<VinylRecordRow> for Listing {
    type Error = RowDecodeError;

    fn try_from(row: VinylRecordRow) -> Result<Self, Self::Error> {
        Listing::new(ListingDraft {
            id: row.id,
            seller_id: UserId::from_uuid(row.seller_id),
            album_name: row.album_name,
            artist: row.artist,
            condition: row.condition,
            price: row.price,
            images: row.images,
            description: row.description,
            genre: row.genre,
            release_year: row.release_year,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .map_err(|err| RowDecodeError::new(err.to_string()))
    }
}

/// Insertable struct for creating new listing rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vinyl_records)]
pub(crate) struct NewVinylRecordRow<'a> {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub album_name: &'a str,
    pub artist: &'a str,
    pub condition: &'a str,
    pub price: Decimal,
    pub images: &'a [String],
    pub description: Option<&'a str>,
    pub genre: Option<&'a str>,
    pub release_year: Option<i32>,
}

impl<'a> NewVinylRecordRow<'a> {
    pub(crate) fn from_domain(listing: &'a Listing) -> Self {
        Self {
            id: listing.id(),
            seller_id: *listing.seller_id().as_uuid(),
            album_name: listing.album_name(),
            artist: listing.artist(),
            condition: listing.condition(),
            price: listing.price(),
            images: listing.images(),
            description: listing.description(),
            genre: listing.genre(),
            release_year: listing.release_year(),
        }
    }
}

// ---------------------------------------------------------------------------
// Offer models
// ---------------------------------------------------------------------------

/// Row struct for reading from the offers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OfferRow {
    pub id: Uuid,
    pub record_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub amount: Decimal,
    pub message: Option<String>,
    pub status: String,
    pub counter_amount: Option<Decimal>,
    pub counter_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = RowDecodeError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let status: OfferStatus = row
            .status
            .parse()
            .map_err(|err: crate::domain::UnknownOfferStatus| {
                RowDecodeError::new(err.to_string())
            })?;
        Ok(Offer {
            id: row.id,
            record_id: row.record_id,
            buyer_id: UserId::from_uuid(row.buyer_id),
            seller_id: UserId::from_uuid(row.seller_id),
            amount: row.amount,
            message: row.message,
            status,
            counter_amount: row.counter_amount,
            counter_message: row.counter_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new offer rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = offers)]
pub(crate) struct NewOfferRow<'a> {
    pub id: Uuid,
    pub record_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub amount: Decimal,
    pub message: Option<&'a str>,
    pub status: &'a str,
}

impl<'a> NewOfferRow<'a> {
    pub(crate) fn from_domain(offer: &'a Offer) -> Self {
        Self {
            id: offer.id,
            record_id: offer.record_id,
            buyer_id: *offer.buyer_id.as_uuid(),
            seller_id: *offer.seller_id.as_uuid(),
            amount: offer.amount,
            message: offer.message.as_deref(),
            status: offer.status.as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Order models
// ---------------------------------------------------------------------------

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub record_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub offer_amount: Decimal,
    pub buyer_fee: Decimal,
    pub seller_fee: Decimal,
    pub total_amount: Decimal,
    pub status: String,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub payment_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub shipping_address: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RowDecodeError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|err: crate::domain::UnknownOrderStatus| {
                RowDecodeError::new(err.to_string())
            })?;
        Ok(Order {
            id: row.id,
            offer_id: row.offer_id,
            record_id: row.record_id,
            buyer_id: UserId::from_uuid(row.buyer_id),
            seller_id: UserId::from_uuid(row.seller_id),
            offer_amount: row.offer_amount,
            buyer_fee: row.buyer_fee,
            seller_fee: row.seller_fee,
            total_amount: row.total_amount,
            status,
            tracking_number: row.tracking_number,
            notes: row.notes,
            payment_session_id: row.payment_session_id,
            payment_intent_id: row.payment_intent_id,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new order rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub record_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub offer_amount: Decimal,
    pub buyer_fee: Decimal,
    pub seller_fee: Decimal,
    pub total_amount: Decimal,
    pub status: &'a str,
    pub payment_session_id: Option<&'a str>,
}

impl<'a> NewOrderRow<'a> {
    pub(crate) fn from_domain(order: &'a Order) -> Self {
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
            status: order.status.as_str(),
            payment_session_id: order.payment_session_id.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile models
// ---------------------------------------------------------------------------

/// Row struct for reading from the profiles table. This service never writes
/// profiles, so there is no insertable counterpart.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub total_sales: i32,
    pub total_purchases: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: UserId::from_uuid(row.user_id),
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            bio: row.bio,
            total_sales: row.total_sales,
            total_purchases: row.total_purchases,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Review models
// ---------------------------------------------------------------------------

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub reviewer_type: String,
    pub overall_rating: i16,
    pub communication_rating: i16,
    pub item_accuracy_rating: i16,
    pub shipping_rating: i16,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RowDecodeError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let reviewer_type: ReviewerType = row
            .reviewer_type
            .parse()
            .map_err(|err: crate::domain::UnknownReviewerType| {
                RowDecodeError::new(err.to_string())
            })?;
        let ratings = ReviewRatings::new(
            row.overall_rating,
            row.communication_rating,
            row.item_accuracy_rating,
            row.shipping_rating,
        )
        .map_err(|err| RowDecodeError::new(err.to_string()))?;
        Ok(Review {
            id: row.id,
            order_id: row.order_id,
            reviewer_id: UserId::from_uuid(row.reviewer_id),
            reviewee_id: UserId::from_uuid(row.reviewee_id),
            reviewer_type,
            ratings,
            review_text: row.review_text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new review rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub order_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub reviewer_type: &'a str,
    pub overall_rating: i16,
    pub communication_rating: i16,
    pub item_accuracy_rating: i16,
    pub shipping_rating: i16,
    pub review_text: Option<&'a str>,
}

impl<'a> NewReviewRow<'a> {
    pub(crate) fn from_domain(review: &'a Review) -> Self {
        Self {
            id: review.id,
            order_id: review.order_id,
            reviewer_id: *review.reviewer_id.as_uuid(),
            reviewee_id: *review.reviewee_id.as_uuid(),
            reviewer_type: review.reviewer_type.as_str(),
            overall_rating: review.ratings.overall,
            communication_rating: review.ratings.communication,
            item_accuracy_rating: review.ratings.item_accuracy,
            shipping_rating: review.ratings.shipping,
            review_text: review.review_text.as_deref(),
        }
    }
}
