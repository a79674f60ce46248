//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain's driving traits and remain testable without I/O.

use std::sync::Arc;

use crate::domain::{
    FeePolicy, ListingCatalogue, OfferNegotiation, OrderFulfilment, ProfileDirectory,
    ReviewLedger, Settlement,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub listings: Arc<dyn ListingCatalogue>,
    pub offers: Arc<dyn OfferNegotiation>,
    pub orders: Arc<dyn OrderFulfilment>,
    pub settlement: Arc<dyn Settlement>,
    pub reviews: Arc<dyn ReviewLedger>,
    pub profiles: Arc<dyn ProfileDirectory>,
    /// Policy used by the fee estimate endpoint; settlement carries its own
    /// copy so quoted and charged amounts share one code path.
    pub fee_policy: FeePolicy,
}
