//! Port for offer persistence and conditional status transitions.
//!
//! Every transition method is a single compare-and-set statement in the
//! adapter: it matches the offer by id *and* expected current status, and
//! returns `None` when no row matched. Callers translate `None` into
//! not-found or invalid-state after re-reading.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Offer, OfferResponse, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by offer repository adapters.
    pub enum OfferRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "offer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "offer repository query failed: {message}",
    }
}

/// Port for offer persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Persist a new pending offer.
    async fn insert(&self, offer: &Offer) -> Result<(), OfferRepositoryError>;

    /// Find an offer by id.
    async fn find_by_id(&self, offer_id: Uuid) -> Result<Option<Offer>, OfferRepositoryError>;

    /// Offers created by a buyer, newest first.
    async fn list_for_buyer(&self, buyer_id: &UserId)
    -> Result<Vec<Offer>, OfferRepositoryError>;

    /// Offers against a seller's listings, newest first.
    async fn list_for_seller(
        &self,
        seller_id: &UserId,
    ) -> Result<Vec<Offer>, OfferRepositoryError>;

    /// Apply a seller response to an offer still in a respondable state
    /// (`pending` or `countered`). Accepting a countered offer reconciles
    /// the amount to the standing counter amount in the same statement.
    /// Returns the updated offer, or `None` when the offer is missing or no
    /// longer respondable.
    async fn apply_response(
        &self,
        offer_id: Uuid,
        response: &OfferResponse,
    ) -> Result<Option<Offer>, OfferRepositoryError>;

    /// Buyer-side acceptance of a standing counter: `countered → accepted`
    /// with the amount reconciled to the counter amount.
    async fn accept_counter(&self, offer_id: Uuid)
    -> Result<Option<Offer>, OfferRepositoryError>;

    /// Buyer-side refusal of a standing counter: `countered → denied`.
    async fn decline_counter(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError>;

    /// Settlement-only transition `accepted → completed`.
    async fn complete_accepted(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError>;
}
