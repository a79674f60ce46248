//! PostgreSQL persistence adapters using Diesel.
//!
//! Thin adapters translating between Diesel rows and domain types; no
//! business logic lives here. Row structs (`models.rs`) and the schema
//! (`schema.rs`) are internal to this module. Connections come from a `bb8`
//! pool with async support through `diesel-async`, and every database error
//! is mapped to the owning port's typed error.

mod diesel_listing_repository;
mod diesel_membership_query;
mod diesel_offer_repository;
mod diesel_order_repository;
mod diesel_profile_repository;
mod diesel_review_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_membership_query::DieselMembershipQuery;
pub use diesel_offer_repository::DieselOfferRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
