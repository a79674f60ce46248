//! Domain layer: entities, ports and services.
//!
//! The domain is the centre of the hexagon. It owns the negotiation and
//! purchase state machines, fee arithmetic and the error taxonomy, and
//! speaks to the outside world only through the traits in [`ports`].

mod error;
mod events;
pub mod fees;
mod ids;
mod listing;
pub mod listing_service;
pub mod money;
mod offer;
pub mod offer_service;
mod order;
pub mod order_service;
pub mod ports;
mod profile;
pub mod profile_service;
mod review;
pub mod review_service;
pub mod settlement;

pub use error::{Error, ErrorCode};
pub use events::{ChangeEvent, ChangedTable};
pub use fees::{FeeBreakdown, FeePolicy, FeeTiers};
pub use ids::{UserId, UserIdValidationError};
pub use listing::{LISTING_MIN_IMAGES, Listing, ListingDraft, ListingValidationError};
pub use listing_service::{CreateListingRequest, ListingCatalogue, ListingCatalogueService};
pub use offer::{Offer, OfferResponse, OfferStatus, UnknownOfferStatus};
pub use offer_service::{
    CounterReply, CreateOfferRequest, OfferNegotiation, OfferNegotiationService,
};
pub use order::{Order, OrderStatus, UnknownOrderStatus};
pub use order_service::{OrderFulfilment, OrderFulfilmentService, ShipmentDetails};
pub use profile::Profile;
pub use profile_service::{ProfileDirectory, ProfileDirectoryService};
pub use review::{
    RATING_MAX, RATING_MIN, RatingOutOfRange, RatingStats, Review, ReviewRatings, ReviewerType,
    UnknownReviewerType,
};
pub use review_service::{ReviewLedger, ReviewLedgerService, SubmitReviewRequest};
pub use settlement::{
    CheckoutRedirects, PaymentVerification, Settlement, SettlementService,
};
