//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (database, payment processor, change feed). Each trait exposes strongly
//! typed errors so adapters map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod event_publisher;
mod listing_repository;
mod membership;
mod offer_repository;
mod order_repository;
mod payment_gateway;
mod profile_repository;
mod review_repository;

#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use event_publisher::{EventPublisher, NoOpEventPublisher};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingRepository, ListingRepositoryError};
#[cfg(test)]
pub use membership::MockMembershipQuery;
pub use membership::{FreeTierMembership, MembershipQuery, MembershipQueryError};
#[cfg(test)]
pub use offer_repository::MockOfferRepository;
pub use offer_repository::{OfferRepository, OfferRepositoryError};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    CheckoutMetadata, CheckoutSession, CheckoutSessionRequest, PaymentGateway,
    PaymentGatewayError, SessionStatus,
};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
