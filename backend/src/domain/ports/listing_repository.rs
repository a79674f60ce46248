//! Port for listing persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Listing, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "listing repository query failed: {message}",
    }
}

/// Port for storing and reading listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Persist a new listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError>;

    /// Find a listing by id.
    async fn find_by_id(&self, listing_id: Uuid) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Most recently created listings, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// All listings owned by one seller, newest first.
    async fn list_for_seller(
        &self,
        seller_id: &UserId,
    ) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// Delete the listing if the seller owns it and no non-cancelled order
    /// references it. Returns `true` when a row was removed.
    async fn delete_if_unsold(
        &self,
        listing_id: Uuid,
        seller_id: &UserId,
    ) -> Result<bool, ListingRepositoryError>;
}
