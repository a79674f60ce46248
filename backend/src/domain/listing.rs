//! Vinyl record listings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::UserId;

/// Minimum number of photos a listing must carry at creation.
pub const LISTING_MIN_IMAGES: usize = 2;

/// Validation errors returned by [`Listing::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    /// Album name is blank.
    #[error("album name must not be empty")]
    EmptyAlbumName,
    /// Artist is blank.
    #[error("artist must not be empty")]
    EmptyArtist,
    /// Condition is blank.
    #[error("condition must not be empty")]
    EmptyCondition,
    /// Price must be strictly positive.
    #[error("price must be greater than zero")]
    NonPositivePrice,
    /// Not enough photos supplied.
    #[error("listing requires at least {min} images")]
    TooFewImages { min: usize },
}

/// Unvalidated listing fields, as received from an adapter.
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub id: Uuid,
    pub seller_id: UserId,
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

/// A record offered for sale.
///
/// Listings are owned by their seller and immutable once sold; the store
/// enforces the "unsold" guard on deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    id: Uuid,
    seller_id: UserId,
    album_name: String,
    artist: String,
    condition: String,
    price: Decimal,
    images: Vec<String>,
    description: Option<String>,
    genre: Option<String>,
    release_year: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Listing {
    /// Validate a draft into a listing.
    pub fn new(draft: ListingDraft) -> Result<Self, ListingValidationError> {
        if draft.album_name.trim().is_empty() {
            return Err(ListingValidationError::EmptyAlbumName);
        }
        if draft.artist.trim().is_empty() {
            return Err(ListingValidationError::EmptyArtist);
        }
        if draft.condition.trim().is_empty() {
            return Err(ListingValidationError::EmptyCondition);
        }
        if draft.price <= Decimal::ZERO {
            return Err(ListingValidationError::NonPositivePrice);
        }
        if draft.images.len() < LISTING_MIN_IMAGES {
            return Err(ListingValidationError::TooFewImages {
                min: LISTING_MIN_IMAGES,
            });
        }

        Ok(Self {
            id: draft.id,
            seller_id: draft.seller_id,
            album_name: draft.album_name,
            artist: draft.artist,
            condition: draft.condition,
            price: draft.price,
            images: draft.images,
            description: draft.description,
            genre: draft.genre,
            release_year: draft.release_year,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn seller_id(&self) -> UserId {
        self.seller_id
    }

    pub fn album_name(&self) -> &str {
        self.album_name.as_str()
    }

    pub fn artist(&self) -> &str {
        self.artist.as_str()
    }

    pub fn condition(&self) -> &str {
        self.condition.as_str()
    }

    pub const fn price(&self) -> Decimal {
        self.price
    }

    pub fn images(&self) -> &[String] {
        self.images.as_slice()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub const fn release_year(&self) -> Option<i32> {
        self.release_year
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Line-item label used on checkout sessions.
    #[must_use]
    pub fn checkout_label(&self) -> String {
        format!("{} by {}", self.album_name, self.artist)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    use super::*;

    #[fixture]
    fn draft() -> ListingDraft {
        let now = Utc::now();
        ListingDraft {
            id: Uuid::new_v4(),
            seller_id: UserId::random(),
            album_name: "Blue Train".to_owned(),
            artist: "John Coltrane".to_owned(),
            condition: "VG+".to_owned(),
            price: dec!(42.00),
            images: vec!["front.jpg".to_owned(), "back.jpg".to_owned()],
            description: None,
            genre: Some("Jazz".to_owned()),
            release_year: Some(1958),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn accepts_a_complete_draft(draft: ListingDraft) {
        let listing = Listing::new(draft).expect("valid draft");
        assert_eq!(listing.checkout_label(), "Blue Train by John Coltrane");
    }

    #[rstest]
    fn rejects_non_positive_price(mut draft: ListingDraft) {
        draft.price = dec!(0);
        let err = Listing::new(draft).expect_err("zero price rejected");
        assert_eq!(err, ListingValidationError::NonPositivePrice);
    }

    #[rstest]
    fn rejects_fewer_than_two_images(mut draft: ListingDraft) {
        draft.images = vec!["front.jpg".to_owned()];
        let err = Listing::new(draft).expect_err("single image rejected");
        assert_eq!(
            err,
            ListingValidationError::TooFewImages {
                min: LISTING_MIN_IMAGES
            }
        );
    }

    #[rstest]
    fn rejects_blank_album_name(mut draft: ListingDraft) {
        draft.album_name = "   ".to_owned();
        let err = Listing::new(draft).expect_err("blank album rejected");
        assert_eq!(err, ListingValidationError::EmptyAlbumName);
    }
}
