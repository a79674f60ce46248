//! Listing catalogue domain service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{EventPublisher, ListingRepository, ListingRepositoryError};
use crate::domain::{
    ChangeEvent, ChangedTable, Error, Listing, ListingDraft, ListingValidationError, UserId,
};

/// Upper bound applied to browse queries.
pub const BROWSE_LIMIT: i64 = 100;

pub(crate) fn map_listing_error(error: ListingRepositoryError) -> Error {
    match error {
        ListingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("listing repository unavailable: {message}"))
        }
        ListingRepositoryError::Query { message } => {
            Error::internal(format!("listing repository error: {message}"))
        }
    }
}

fn map_validation_error(error: ListingValidationError) -> Error {
    let field = match &error {
        ListingValidationError::EmptyAlbumName => "albumName",
        ListingValidationError::EmptyArtist => "artist",
        ListingValidationError::EmptyCondition => "condition",
        ListingValidationError::NonPositivePrice => "price",
        ListingValidationError::TooFewImages { .. } => "images",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

/// Request payload for publishing a new listing.
#[derive(Debug, Clone)]
pub struct CreateListingRequest {
    pub seller_id: UserId,
    pub album_name: String,
    pub artist: String,
    pub condition: String,
    pub price: Decimal,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
}

/// Driving port for the listing catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCatalogue: Send + Sync {
    /// Validate and publish a new listing.
    async fn create_listing(&self, request: CreateListingRequest) -> Result<Listing, Error>;

    /// Fetch one listing.
    async fn get(&self, listing_id: Uuid) -> Result<Listing, Error>;

    /// Most recent listings for browsing.
    async fn browse(&self) -> Result<Vec<Listing>, Error>;

    /// All listings owned by one seller.
    async fn list_for_seller(&self, seller_id: UserId) -> Result<Vec<Listing>, Error>;

    /// Delete a listing the seller owns, provided it has not sold. A listing
    /// referenced by any non-cancelled order is considered sold.
    async fn delete_listing(&self, listing_id: Uuid, acting_seller: UserId) -> Result<(), Error>;
}

/// Listing catalogue service over the listing port.
pub struct ListingCatalogueService<L> {
    listings: Arc<L>,
    events: Arc<dyn EventPublisher>,
}

impl<L> ListingCatalogueService<L> {
    /// Create the service with its driven ports.
    pub fn new(listings: Arc<L>, events: Arc<dyn EventPublisher>) -> Self {
        Self { listings, events }
    }
}

#[async_trait]
impl<L> ListingCatalogue for ListingCatalogueService<L>
where
    L: ListingRepository,
{
    async fn create_listing(&self, request: CreateListingRequest) -> Result<Listing, Error> {
        let now = Utc::now();
        let listing = Listing::new(ListingDraft {
            id: Uuid::new_v4(),
            seller_id: request.seller_id,
            album_name: request.album_name,
            artist: request.artist,
            condition: request.condition,
            price: request.price,
            images: request.images,
            description: request.description,
            genre: request.genre,
            release_year: request.release_year,
            created_at: now,
            updated_at: now,
        })
        .map_err(map_validation_error)?;

        self.listings
            .insert(&listing)
            .await
            .map_err(map_listing_error)?;

        tracing::info!(listing_id = %listing.id(), "listing published");
        self.events
            .publish(ChangeEvent::new(ChangedTable::VinylRecords, listing.id()));
        Ok(listing)
    }

    async fn get(&self, listing_id: Uuid) -> Result<Listing, Error> {
        self.listings
            .find_by_id(listing_id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found(format!("listing {listing_id} not found")))
    }

    async fn browse(&self) -> Result<Vec<Listing>, Error> {
        self.listings
            .list_recent(BROWSE_LIMIT)
            .await
            .map_err(map_listing_error)
    }

    async fn list_for_seller(&self, seller_id: UserId) -> Result<Vec<Listing>, Error> {
        self.listings
            .list_for_seller(&seller_id)
            .await
            .map_err(map_listing_error)
    }

    async fn delete_listing(&self, listing_id: Uuid, acting_seller: UserId) -> Result<(), Error> {
        let deleted = self
            .listings
            .delete_if_unsold(listing_id, &acting_seller)
            .await
            .map_err(map_listing_error)?;
        if deleted {
            tracing::info!(listing_id = %listing_id, "listing deleted");
            self.events
                .publish(ChangeEvent::new(ChangedTable::VinylRecords, listing_id));
            return Ok(());
        }

        // Distinguish the three ways the guarded delete can miss.
        let listing = self
            .listings
            .find_by_id(listing_id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found(format!("listing {listing_id} not found")))?;
        if listing.seller_id() != acting_seller {
            return Err(Error::forbidden(
                "only the listing's seller may delete it",
            ));
        }
        Err(Error::invalid_state(
            "listing has a live order and can no longer be deleted",
        ))
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
