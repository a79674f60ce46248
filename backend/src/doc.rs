//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every negotiation, fulfilment, settlement and review
//! endpoint plus the shared error schema. The document is served as JSON at
//! `/api-docs/openapi.json`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, FeeBreakdown, RatingStats, ReviewRatings};
use crate::inbound::http::listings::{CreateListingRequestBody, ListingResponseBody};
use crate::inbound::http::offers::{
    CounterReplyRequestBody, CreateOfferRequestBody, OfferResponseBody, RespondRequestBody,
};
use crate::inbound::http::orders::{OrderResponseBody, ShipRequestBody};
use crate::inbound::http::payments::{
    CreateCheckoutRequestBody, CreateCheckoutResponseBody, VerifyPaymentRequestBody,
    VerifyPaymentResponseBody,
};
use crate::inbound::http::profiles::ProfileResponseBody;
use crate::inbound::http::reviews::{ReviewResponseBody, SubmitReviewRequestBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie established by the external identity flow.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Vinyl marketplace backend API",
        description = "HTTP interface for listing records, negotiating offers, \
                       settling payments and exchanging reviews."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::listings::browse_listings,
        crate::inbound::http::listings::get_listing,
        crate::inbound::http::listings::delete_listing,
        crate::inbound::http::offers::create_offer,
        crate::inbound::http::offers::list_offers,
        crate::inbound::http::offers::respond_to_offer,
        crate::inbound::http::offers::reply_to_counter,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::ship_order,
        crate::inbound::http::orders::complete_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::payments::create_checkout,
        crate::inbound::http::payments::verify_payment,
        crate::inbound::http::fees::estimate_fees,
        crate::inbound::http::reviews::submit_review,
        crate::inbound::http::reviews::list_order_reviews,
        crate::inbound::http::reviews::get_rating_stats,
        crate::inbound::http::profiles::get_user_profile,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FeeBreakdown,
        RatingStats,
        ReviewRatings,
        CreateListingRequestBody,
        ListingResponseBody,
        CreateOfferRequestBody,
        RespondRequestBody,
        CounterReplyRequestBody,
        OfferResponseBody,
        ShipRequestBody,
        OrderResponseBody,
        CreateCheckoutRequestBody,
        CreateCheckoutResponseBody,
        VerifyPaymentRequestBody,
        VerifyPaymentResponseBody,
        SubmitReviewRequestBody,
        ReviewResponseBody,
        ProfileResponseBody,
    )),
    tags(
        (name = "listings", description = "Listing catalogue"),
        (name = "offers", description = "Offer negotiation"),
        (name = "orders", description = "Order fulfilment"),
        (name = "payments", description = "Checkout and payment verification"),
        (name = "fees", description = "Fee quoting"),
        (name = "reviews", description = "Post-transaction reviews"),
        (name = "users", description = "User profiles")
    )
)]
pub struct ApiDoc;
