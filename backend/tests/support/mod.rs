//! In-memory adapters backing the end-to-end flow tests.
//!
//! One shared [`InMemoryStore`] plays the role of the database; each adapter
//! implements its port against the same store so cross-table rules (the
//! sold-listing delete guard, session-keyed payment) behave like the SQL
//! adapters.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use backend::domain::ports::{
    CheckoutSession, CheckoutSessionRequest, ListingRepository, ListingRepositoryError,
    MembershipQuery, MembershipQueryError, OfferRepository, OfferRepositoryError, OrderRepository,
    OrderRepositoryError, PaymentGateway, PaymentGatewayError, ReviewRepository,
    ReviewRepositoryError, SessionStatus,
};
use backend::domain::{
    Listing, Offer, OfferResponse, OfferStatus, Order, OrderStatus, RatingStats, Review, UserId,
};

/// Shared in-memory tables.
#[derive(Default)]
pub struct InMemoryStore {
    pub listings: Mutex<HashMap<Uuid, Listing>>,
    pub offers: Mutex<HashMap<Uuid, Offer>>,
    pub orders: Mutex<HashMap<Uuid, Order>>,
    pub reviews: Mutex<HashMap<Uuid, Review>>,
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        self.listings
            .lock()
            .expect("lock")
            .insert(listing.id(), listing.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        listing_id: Uuid,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(self.listings.lock().expect("lock").get(&listing_id).cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut listings: Vec<Listing> =
            self.listings.lock().expect("lock").values().cloned().collect();
        listings.sort_by_key(|listing| std::cmp::Reverse(listing.created_at()));
        listings.truncate(usize::try_from(limit).expect("non-negative limit"));
        Ok(listings)
    }

    async fn list_for_seller(
        &self,
        seller_id: &UserId,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut listings: Vec<Listing> = self
            .listings
            .lock()
            .expect("lock")
            .values()
            .filter(|listing| listing.seller_id() == *seller_id)
            .cloned()
            .collect();
        listings.sort_by_key(|listing| std::cmp::Reverse(listing.created_at()));
        Ok(listings)
    }

    async fn delete_if_unsold(
        &self,
        listing_id: Uuid,
        seller_id: &UserId,
    ) -> Result<bool, ListingRepositoryError> {
        let sold = self
            .orders
            .lock()
            .expect("lock")
            .values()
            .any(|order| order.record_id == listing_id && order.status != OrderStatus::Cancelled);
        if sold {
            return Ok(false);
        }
        let mut listings = self.listings.lock().expect("lock");
        match listings.get(&listing_id) {
            Some(listing) if listing.seller_id() == *seller_id => {
                listings.remove(&listing_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn update_offer<F>(
    offers: &Mutex<HashMap<Uuid, Offer>>,
    offer_id: Uuid,
    expected: &[OfferStatus],
    apply: F,
) -> Option<Offer>
where
    F: FnOnce(&mut Offer),
{
    let mut offers = offers.lock().expect("lock");
    let offer = offers.get_mut(&offer_id)?;
    if !expected.contains(&offer.status) {
        return None;
    }
    apply(offer);
    offer.updated_at = Utc::now();
    Some(offer.clone())
}

#[async_trait]
impl OfferRepository for InMemoryStore {
    async fn insert(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        self.offers
            .lock()
            .expect("lock")
            .insert(offer.id, offer.clone());
        Ok(())
    }

    async fn find_by_id(&self, offer_id: Uuid) -> Result<Option<Offer>, OfferRepositoryError> {
        Ok(self.offers.lock().expect("lock").get(&offer_id).cloned())
    }

    async fn list_for_buyer(
        &self,
        buyer_id: &UserId,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut offers: Vec<Offer> = self
            .offers
            .lock()
            .expect("lock")
            .values()
            .filter(|offer| offer.buyer_id == *buyer_id)
            .cloned()
            .collect();
        offers.sort_by_key(|offer| std::cmp::Reverse(offer.created_at));
        Ok(offers)
    }

    async fn list_for_seller(
        &self,
        seller_id: &UserId,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut offers: Vec<Offer> = self
            .offers
            .lock()
            .expect("lock")
            .values()
            .filter(|offer| offer.seller_id == *seller_id)
            .cloned()
            .collect();
        offers.sort_by_key(|offer| std::cmp::Reverse(offer.created_at));
        Ok(offers)
    }

    async fn apply_response(
        &self,
        offer_id: Uuid,
        response: &OfferResponse,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        let respondable = [OfferStatus::Pending, OfferStatus::Countered];
        Ok(match response {
            OfferResponse::Accept => {
                update_offer(&self.offers, offer_id, &respondable, |offer| {
                    offer.status = OfferStatus::Accepted;
                    offer.amount = offer.counter_amount.unwrap_or(offer.amount);
                })
            }
            OfferResponse::Deny => update_offer(&self.offers, offer_id, &respondable, |offer| {
                offer.status = OfferStatus::Denied;
            }),
            OfferResponse::Counter { amount, message } => {
                update_offer(&self.offers, offer_id, &respondable, |offer| {
                    offer.status = OfferStatus::Countered;
                    offer.counter_amount = Some(*amount);
                    offer.counter_message.clone_from(message);
                })
            }
        })
    }

    async fn accept_counter(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        Ok(update_offer(
            &self.offers,
            offer_id,
            &[OfferStatus::Countered],
            |offer| {
                offer.status = OfferStatus::Accepted;
                offer.amount = offer.counter_amount.unwrap_or(offer.amount);
            },
        ))
    }

    async fn decline_counter(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        Ok(update_offer(
            &self.offers,
            offer_id,
            &[OfferStatus::Countered],
            |offer| {
                offer.status = OfferStatus::Denied;
            },
        ))
    }

    async fn complete_accepted(
        &self,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, OfferRepositoryError> {
        Ok(update_offer(
            &self.offers,
            offer_id,
            &[OfferStatus::Accepted],
            |offer| {
                offer.status = OfferStatus::Completed;
            },
        ))
    }
}

fn update_order<F>(
    orders: &Mutex<HashMap<Uuid, Order>>,
    order_id: Uuid,
    expected: &[OrderStatus],
    apply: F,
) -> Option<Order>
where
    F: FnOnce(&mut Order),
{
    let mut orders = orders.lock().expect("lock");
    let order = orders.get_mut(&order_id)?;
    if !expected.contains(&order.status) {
        return None;
    }
    apply(order);
    order.updated_at = Utc::now();
    Some(order.clone())
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut orders = self.orders.lock().expect("lock");
        let live = orders.values().any(|existing| {
            existing.offer_id == order.offer_id && existing.status != OrderStatus::Cancelled
        });
        if live {
            return Err(OrderRepositoryError::DuplicateOffer {
                offer_id: order.offer_id,
            });
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self.orders.lock().expect("lock").get(&order_id).cloned())
    }

    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self
            .orders
            .lock()
            .expect("lock")
            .values()
            .find(|order| order.payment_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .expect("lock")
            .values()
            .filter(|order| order.buyer_id == *user_id || order.seller_id == *user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| std::cmp::Reverse(order.created_at));
        Ok(orders)
    }

    async fn mark_paid(
        &self,
        session_id: &str,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut orders = self.orders.lock().expect("lock");
        let order = orders.values_mut().find(|order| {
            order.payment_session_id.as_deref() == Some(session_id)
                && order.status == OrderStatus::PendingPayment
        });
        Ok(order.map(|order| {
            order.status = OrderStatus::Paid;
            order.payment_intent_id = Some(payment_intent_id.to_owned());
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn mark_shipped(
        &self,
        order_id: Uuid,
        tracking_number: Option<String>,
        notes: Option<String>,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(update_order(
            &self.orders,
            order_id,
            &[OrderStatus::Paid],
            |order| {
                order.status = OrderStatus::Shipped;
                order.tracking_number = tracking_number;
                order.notes = notes;
            },
        ))
    }

    async fn mark_completed(
        &self,
        order_id: Uuid,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(update_order(
            &self.orders,
            order_id,
            &[OrderStatus::Shipped],
            |order| {
                order.status = OrderStatus::Completed;
            },
        ))
    }

    async fn cancel(&self, order_id: Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(update_order(
            &self.orders,
            order_id,
            &[
                OrderStatus::PendingPayment,
                OrderStatus::Paid,
                OrderStatus::Shipped,
            ],
            |order| {
                order.status = OrderStatus::Cancelled;
            },
        ))
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn insert(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut reviews = self.reviews.lock().expect("lock");
        let duplicate = reviews.values().any(|existing| {
            existing.order_id == review.order_id && existing.reviewer_id == review.reviewer_id
        });
        if duplicate {
            return Err(ReviewRepositoryError::Duplicate {
                order_id: review.order_id,
                reviewer_id: *review.reviewer_id.as_uuid(),
            });
        }
        reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        Ok(self
            .reviews
            .lock()
            .expect("lock")
            .values()
            .filter(|review| review.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn rating_stats(
        &self,
        user_id: &UserId,
    ) -> Result<RatingStats, ReviewRepositoryError> {
        let reviews = self.reviews.lock().expect("lock");
        let targeted: Vec<&Review> = reviews
            .values()
            .filter(|review| review.reviewee_id == *user_id)
            .collect();
        if targeted.is_empty() {
            return Ok(RatingStats::empty());
        }
        let total = Decimal::from(targeted.len());
        let mean = |pick: fn(&Review) -> i16| {
            let sum: Decimal = targeted
                .iter()
                .map(|review| Decimal::from(pick(review)))
                .sum();
            backend::domain::money::round_money(sum / total)
        };
        Ok(RatingStats {
            overall_avg: mean(|review| review.ratings.overall),
            communication_avg: mean(|review| review.ratings.communication),
            item_accuracy_avg: mean(|review| review.ratings.item_accuracy),
            shipping_avg: mean(|review| review.ratings.shipping),
            total_reviews: i64::try_from(targeted.len()).expect("count fits"),
        })
    }
}

/// Membership lookup over a fixed set of Pro users.
#[derive(Default)]
pub struct StaticMembership {
    pub pro_users: Vec<UserId>,
}

#[async_trait]
impl MembershipQuery for StaticMembership {
    async fn is_pro(&self, user_id: &UserId) -> Result<bool, MembershipQueryError> {
        Ok(self.pro_users.contains(user_id))
    }
}

/// Scripted payment gateway: sessions open unpaid and settle when the test
/// calls [`FakeGateway::settle`].
#[derive(Default)]
pub struct FakeGateway {
    sessions: Mutex<HashMap<String, SessionStatus>>,
    pub created: Mutex<Vec<CheckoutSessionRequest>>,
}

impl FakeGateway {
    /// Mark a session paid with the given payment intent.
    pub fn settle(&self, session_id: &str, payment_intent_id: &str) {
        self.sessions.lock().expect("lock").insert(
            session_id.to_owned(),
            SessionStatus {
                payment_status: "paid".to_owned(),
                payment_intent_id: Some(payment_intent_id.to_owned()),
            },
        );
    }

    /// How many checkout sessions were opened.
    pub fn created_count(&self) -> usize {
        self.created.lock().expect("lock").len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let mut created = self.created.lock().expect("lock");
        created.push(request.clone());
        let id = format!("cs_test_{}", created.len());
        self.sessions.lock().expect("lock").insert(
            id.clone(),
            SessionStatus {
                payment_status: "unpaid".to_owned(),
                payment_intent_id: None,
            },
        );
        Ok(CheckoutSession {
            url: format!("https://checkout.test/pay/{id}"),
            id,
        })
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<SessionStatus, PaymentGatewayError> {
        self.sessions
            .lock()
            .expect("lock")
            .get(session_id)
            .cloned()
            .ok_or_else(|| {
                PaymentGatewayError::invalid_request(format!("unknown session {session_id}"))
            })
    }
}
