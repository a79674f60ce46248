//! Offer negotiation domain service.
//!
//! Implements the buyer/seller negotiation loop over the offer and listing
//! ports. Status transitions rely on the repository's compare-and-set
//! semantics: a caller that loses a race receives an invalid-state error,
//! never a silent overwrite.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::listing_service::map_listing_error;
use crate::domain::money::require_positive;
use crate::domain::ports::{
    EventPublisher, ListingRepository, OfferRepository, OfferRepositoryError,
};
use crate::domain::{ChangeEvent, ChangedTable, Error, Offer, OfferResponse, UserId};

pub(crate) fn map_offer_error(error: OfferRepositoryError) -> Error {
    match error {
        OfferRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("offer repository unavailable: {message}"))
        }
        OfferRepositoryError::Query { message } => {
            Error::internal(format!("offer repository error: {message}"))
        }
    }
}

/// Request payload for opening a negotiation.
#[derive(Debug, Clone)]
pub struct CreateOfferRequest {
    pub record_id: Uuid,
    pub buyer_id: UserId,
    pub amount: Decimal,
    pub message: Option<String>,
}

/// A buyer's reply to a standing counter-offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterReply {
    /// Take the seller's counter amount; the offer becomes accepted.
    Accept,
    /// Walk away; the offer becomes denied.
    Decline,
}

/// Driving port for offer negotiation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferNegotiation: Send + Sync {
    /// Open a pending offer against a listing.
    async fn create_offer(&self, request: CreateOfferRequest) -> Result<Offer, Error>;

    /// Apply the seller's accept/deny/counter decision.
    async fn respond(
        &self,
        offer_id: Uuid,
        acting_seller: UserId,
        response: OfferResponse,
    ) -> Result<Offer, Error>;

    /// Apply the buyer's reply to a standing counter-offer.
    async fn counter_reply(
        &self,
        offer_id: Uuid,
        acting_buyer: UserId,
        reply: CounterReply,
    ) -> Result<Offer, Error>;

    /// Offers the buyer has made, newest first.
    async fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Offer>, Error>;

    /// Offers against the seller's listings, newest first.
    async fn list_for_seller(&self, seller_id: UserId) -> Result<Vec<Offer>, Error>;
}

/// Offer negotiation service over the listing and offer ports.
pub struct OfferNegotiationService<L, O> {
    listings: Arc<L>,
    offers: Arc<O>,
    events: Arc<dyn EventPublisher>,
}

impl<L, O> OfferNegotiationService<L, O> {
    /// Create the service with its driven ports.
    pub fn new(listings: Arc<L>, offers: Arc<O>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            listings,
            offers,
            events,
        }
    }
}

impl<L, O> OfferNegotiationService<L, O>
where
    L: ListingRepository,
    O: OfferRepository,
{
    /// Translate a compare-and-set miss into not-found or invalid-state by
    /// re-reading the authoritative row.
    async fn explain_transition_miss(&self, offer_id: Uuid) -> Error {
        match self.offers.find_by_id(offer_id).await {
            Ok(Some(offer)) => Error::invalid_state(format!(
                "offer {offer_id} is {}, no longer open for this response",
                offer.status
            )),
            Ok(None) => Error::not_found(format!("offer {offer_id} not found")),
            Err(error) => map_offer_error(error),
        }
    }
}

#[async_trait]
impl<L, O> OfferNegotiation for OfferNegotiationService<L, O>
where
    L: ListingRepository,
    O: OfferRepository,
{
    async fn create_offer(&self, request: CreateOfferRequest) -> Result<Offer, Error> {
        require_positive(request.amount, "amount")?;

        let listing = self
            .listings
            .find_by_id(request.record_id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found(format!("listing {} not found", request.record_id)))?;

        if listing.seller_id() == request.buyer_id {
            return Err(Error::invalid_request(
                "you cannot make an offer on your own listing",
            ));
        }

        let offer = Offer::open(
            request.record_id,
            request.buyer_id,
            listing.seller_id(),
            request.amount,
            request.message,
        );
        self.offers.insert(&offer).await.map_err(map_offer_error)?;

        tracing::info!(offer_id = %offer.id, record_id = %offer.record_id, "offer created");
        self.events
            .publish(ChangeEvent::new(ChangedTable::Offers, offer.id));
        Ok(offer)
    }

    async fn respond(
        &self,
        offer_id: Uuid,
        acting_seller: UserId,
        response: OfferResponse,
    ) -> Result<Offer, Error> {
        if let OfferResponse::Counter { amount, .. } = &response {
            require_positive(*amount, "counterAmount")?;
        }

        let current = self
            .offers
            .find_by_id(offer_id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| Error::not_found(format!("offer {offer_id} not found")))?;

        if current.seller_id != acting_seller {
            return Err(Error::forbidden(
                "only the listing's seller may respond to this offer",
            ));
        }

        let Some(updated) = self
            .offers
            .apply_response(offer_id, &response)
            .await
            .map_err(map_offer_error)?
        else {
            return Err(self.explain_transition_miss(offer_id).await);
        };

        tracing::info!(offer_id = %offer_id, status = %updated.status, "seller responded to offer");
        self.events
            .publish(ChangeEvent::new(ChangedTable::Offers, offer_id));
        Ok(updated)
    }

    async fn counter_reply(
        &self,
        offer_id: Uuid,
        acting_buyer: UserId,
        reply: CounterReply,
    ) -> Result<Offer, Error> {
        let current = self
            .offers
            .find_by_id(offer_id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| Error::not_found(format!("offer {offer_id} not found")))?;

        if current.buyer_id != acting_buyer {
            return Err(Error::forbidden(
                "only the offer's buyer may respond to a counter-offer",
            ));
        }

        let transition = match reply {
            CounterReply::Accept => self.offers.accept_counter(offer_id).await,
            CounterReply::Decline => self.offers.decline_counter(offer_id).await,
        };
        let Some(updated) = transition.map_err(map_offer_error)? else {
            return Err(self.explain_transition_miss(offer_id).await);
        };

        tracing::info!(offer_id = %offer_id, status = %updated.status, "buyer replied to counter");
        self.events
            .publish(ChangeEvent::new(ChangedTable::Offers, offer_id));
        Ok(updated)
    }

    async fn list_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Offer>, Error> {
        self.offers
            .list_for_buyer(&buyer_id)
            .await
            .map_err(map_offer_error)
    }

    async fn list_for_seller(&self, seller_id: UserId) -> Result<Vec<Offer>, Error> {
        self.offers
            .list_for_seller(&seller_id)
            .await
            .map_err(map_offer_error)
    }
}

#[cfg(test)]
#[path = "offer_service_tests.rs"]
mod tests;
