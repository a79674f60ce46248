//! Payment settlement domain service.
//!
//! Bridges an accepted offer into a paid order: opens a hosted checkout
//! session for the fee-inclusive total, then verifies payment against the
//! processor and applies the paid transition exactly once. The processor is
//! the source of truth for payment state; order rows only mirror it.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use crate::domain::fees::{FeePolicy, FeeTiers};
use crate::domain::listing_service::map_listing_error;
use crate::domain::offer_service::map_offer_error;
use crate::domain::order_service::map_order_error;
use crate::domain::ports::{
    CheckoutMetadata, CheckoutSession, CheckoutSessionRequest, EventPublisher, ListingRepository,
    MembershipQuery, MembershipQueryError, OfferRepository, OrderRepository, PaymentGateway,
    PaymentGatewayError,
};
use crate::domain::{
    ChangeEvent, ChangedTable, Error, OfferStatus, Order, OrderStatus, UserId,
};

fn map_membership_error(error: MembershipQueryError) -> Error {
    match error {
        MembershipQueryError::Connection { message } => {
            Error::service_unavailable(format!("membership lookup unavailable: {message}"))
        }
        MembershipQueryError::Query { message } => {
            Error::internal(format!("membership lookup error: {message}"))
        }
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    Error::payment_failed(error.to_string())
}

/// Where the processor sends the buyer after checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRedirects {
    pub success_url: Url,
    pub cancel_url: Url,
}

/// Outcome of verifying a checkout session against the processor.
#[derive(Debug, Clone)]
pub struct PaymentVerification {
    /// Whether the session is paid (including previously verified sessions).
    pub success: bool,
    /// Raw processor payment status.
    pub payment_status: String,
    /// The order in its post-verification state, when one matched.
    pub order: Option<Order>,
}

/// Driving port for payment settlement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Open a checkout session for an accepted offer and materialise the
    /// `pending_payment` order. Buyer only.
    async fn initiate_checkout(
        &self,
        offer_id: Uuid,
        acting_buyer: UserId,
    ) -> Result<CheckoutSession, Error>;

    /// Check a session against the processor and, if paid, apply
    /// `pending_payment → paid` and complete the linked offer. Idempotent:
    /// re-verifying an already-paid session reports success without
    /// re-applying side effects.
    async fn verify_payment(&self, session_id: &str) -> Result<PaymentVerification, Error>;
}

/// Settlement service over the listing, offer, order, membership and
/// payment ports.
pub struct SettlementService<L, O, D, M, G> {
    listings: Arc<L>,
    offers: Arc<O>,
    orders: Arc<D>,
    membership: Arc<M>,
    gateway: Arc<G>,
    events: Arc<dyn EventPublisher>,
    policy: FeePolicy,
    redirects: CheckoutRedirects,
}

impl<L, O, D, M, G> SettlementService<L, O, D, M, G> {
    /// Create the service with its driven ports and checkout configuration.
    #[expect(clippy::too_many_arguments, reason = "wiring happens once at startup")]
    pub fn new(
        listings: Arc<L>,
        offers: Arc<O>,
        orders: Arc<D>,
        membership: Arc<M>,
        gateway: Arc<G>,
        events: Arc<dyn EventPublisher>,
        policy: FeePolicy,
        redirects: CheckoutRedirects,
    ) -> Self {
        Self {
            listings,
            offers,
            orders,
            membership,
            gateway,
            events,
            policy,
            redirects,
        }
    }
}

impl<L, O, D, M, G> SettlementService<L, O, D, M, G>
where
    L: ListingRepository,
    O: OfferRepository,
    D: OrderRepository,
    M: MembershipQuery,
    G: PaymentGateway,
{
    async fn fee_tiers(&self, buyer_id: UserId, seller_id: UserId) -> Result<FeeTiers, Error> {
        let buyer_is_pro = self
            .membership
            .is_pro(&buyer_id)
            .await
            .map_err(map_membership_error)?;
        let seller_is_pro = self
            .membership
            .is_pro(&seller_id)
            .await
            .map_err(map_membership_error)?;
        Ok(FeeTiers {
            buyer_is_pro,
            seller_is_pro,
        })
    }

    /// Flip the linked offer to completed once payment is captured.
    ///
    /// A miss here is tolerated when the offer already completed (a
    /// concurrent verification won the race); anything else is logged and
    /// left for reconciliation since the payment itself has been recorded.
    async fn complete_linked_offer(&self, offer_id: Uuid) {
        match self.offers.complete_accepted(offer_id).await {
            Ok(Some(_)) => {
                self.events
                    .publish(ChangeEvent::new(ChangedTable::Offers, offer_id));
            }
            Ok(None) => match self.offers.find_by_id(offer_id).await {
                Ok(Some(offer)) if offer.status == OfferStatus::Completed => {}
                Ok(Some(offer)) => {
                    tracing::warn!(
                        offer_id = %offer_id,
                        status = %offer.status,
                        "paid order references an offer not in accepted state"
                    );
                }
                Ok(None) => {
                    tracing::warn!(offer_id = %offer_id, "paid order references a missing offer");
                }
                Err(error) => {
                    tracing::warn!(offer_id = %offer_id, error = %error, "offer re-read failed");
                }
            },
            Err(error) => {
                tracing::warn!(offer_id = %offer_id, error = %error, "offer completion failed");
            }
        }
    }
}

#[async_trait]
impl<L, O, D, M, G> Settlement for SettlementService<L, O, D, M, G>
where
    L: ListingRepository,
    O: OfferRepository,
    D: OrderRepository,
    M: MembershipQuery,
    G: PaymentGateway,
{
    async fn initiate_checkout(
        &self,
        offer_id: Uuid,
        acting_buyer: UserId,
    ) -> Result<CheckoutSession, Error> {
        let offer = self
            .offers
            .find_by_id(offer_id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| Error::not_found(format!("offer {offer_id} not found")))?;

        if offer.buyer_id != acting_buyer {
            return Err(Error::forbidden("only the offer's buyer may check out"));
        }
        if offer.status != OfferStatus::Accepted {
            return Err(Error::invalid_state(format!(
                "offer {offer_id} is {}, only accepted offers can be checked out",
                offer.status
            )));
        }

        let listing = self
            .listings
            .find_by_id(offer.record_id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found(format!("listing {} not found", offer.record_id)))?;

        let tiers = self.fee_tiers(offer.buyer_id, offer.seller_id).await?;
        let fees = self.policy.compute(offer.settlement_amount(), tiers);

        let session = self
            .gateway
            .create_session(&CheckoutSessionRequest {
                total: fees.total,
                description: listing.checkout_label(),
                metadata: CheckoutMetadata {
                    offer_id: offer.id,
                    record_id: offer.record_id,
                    buyer_id: *offer.buyer_id.as_uuid(),
                    seller_id: *offer.seller_id.as_uuid(),
                },
                success_url: self.redirects.success_url.clone(),
                cancel_url: self.redirects.cancel_url.clone(),
            })
            .await
            .map_err(map_gateway_error)?;

        let order = Order::pending_payment(
            offer.id,
            offer.record_id,
            offer.buyer_id,
            offer.seller_id,
            &fees,
            session.id.clone(),
        );
        self.orders.insert(&order).await.map_err(map_order_error)?;

        tracing::info!(
            order_id = %order.id,
            offer_id = %offer.id,
            total = %fees.total,
            "checkout session opened"
        );
        self.events
            .publish(ChangeEvent::new(ChangedTable::Orders, order.id));
        Ok(session)
    }

    async fn verify_payment(&self, session_id: &str) -> Result<PaymentVerification, Error> {
        let order = self
            .orders
            .find_by_session(session_id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found("no order matches this checkout session"))?;

        // A session verified earlier reports success without new side effects.
        if order.status != OrderStatus::PendingPayment {
            let success = !matches!(order.status, OrderStatus::Cancelled);
            return Ok(PaymentVerification {
                success,
                payment_status: if success { "paid" } else { "cancelled" }.to_owned(),
                order: Some(order),
            });
        }

        let status = self
            .gateway
            .retrieve_session(session_id)
            .await
            .map_err(map_gateway_error)?;

        if !status.is_paid() {
            return Ok(PaymentVerification {
                success: false,
                payment_status: status.payment_status,
                order: Some(order),
            });
        }

        let intent = status.payment_intent_id.as_deref().unwrap_or_default();
        let updated = match self
            .orders
            .mark_paid(session_id, intent)
            .await
            .map_err(map_order_error)?
        {
            Some(updated) => {
                tracing::info!(order_id = %updated.id, "payment confirmed");
                self.events
                    .publish(ChangeEvent::new(ChangedTable::Orders, updated.id));
                self.complete_linked_offer(updated.offer_id).await;
                updated
            }
            // Lost the race against a concurrent verification; the winner
            // already applied the side effects.
            None => self
                .orders
                .find_by_session(session_id)
                .await
                .map_err(map_order_error)?
                .ok_or_else(|| Error::not_found("no order matches this checkout session"))?,
        };

        Ok(PaymentVerification {
            success: true,
            payment_status: "paid".to_owned(),
            order: Some(updated),
        })
    }
}

#[cfg(test)]
#[path = "settlement_tests.rs"]
mod tests;
