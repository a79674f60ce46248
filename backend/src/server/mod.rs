//! Server construction and wiring.
//!
//! Builds the connection pool, runs pending migrations, assembles the domain
//! services over their Diesel and Stripe adapters, and starts the Actix
//! server with session middleware and the OpenAPI document.

mod config;

pub use config::{ConfigError, ServerConfig};

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpResponse, HttpServer, web};
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use url::Url;
use utoipa::OpenApi;

use crate::doc::ApiDoc;
use crate::domain::ports::EventPublisher;
use crate::domain::settlement::CheckoutRedirects;
use crate::domain::{
    FeePolicy, ListingCatalogueService, OfferNegotiationService, OrderFulfilmentService,
    ProfileDirectoryService, ReviewLedgerService, SettlementService,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{fees, listings, offers, orders, payments, profiles, reviews};
use crate::inbound::ws::{ChangeBroadcaster, change_feed};
use crate::outbound::payments::StripeCheckoutGateway;
use crate::outbound::persistence::{
    DbPool, DieselListingRepository, DieselMembershipQuery, DieselOfferRepository,
    DieselOrderRepository, DieselProfileRepository, DieselReviewRepository, PoolConfig,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut connection = PgConnection::establish(database_url)
        .map_err(|error| std::io::Error::other(format!("database connection failed: {error}")))?;
    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| std::io::Error::other(format!("migrations failed: {error}")))?;
    Ok(())
}

/// Build the processor redirect targets under the public base URL.
///
/// The success URL carries the processor's session id placeholder so the
/// client can verify the payment after the redirect.
fn checkout_redirects(base: &Url) -> std::io::Result<CheckoutRedirects> {
    let mut success_url = base
        .join("payment/success")
        .map_err(std::io::Error::other)?;
    success_url.set_query(Some("session_id={CHECKOUT_SESSION_ID}"));
    let cancel_url = base.join("payment/cancel").map_err(std::io::Error::other)?;
    Ok(CheckoutRedirects {
        success_url,
        cancel_url,
    })
}

async fn build_http_state(
    config: &ServerConfig,
    broadcaster: &ChangeBroadcaster,
) -> std::io::Result<HttpState> {
    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(std::io::Error::other)?;

    let listing_repo = Arc::new(DieselListingRepository::new(pool.clone()));
    let offer_repo = Arc::new(DieselOfferRepository::new(pool.clone()));
    let order_repo = Arc::new(DieselOrderRepository::new(pool.clone()));
    let review_repo = Arc::new(DieselReviewRepository::new(pool.clone()));
    let profile_repo = Arc::new(DieselProfileRepository::new(pool.clone()));
    let membership = Arc::new(DieselMembershipQuery::new(pool));

    let gateway = Arc::new(
        StripeCheckoutGateway::new(config.payment_secret_key.clone())
            .map_err(std::io::Error::other)?,
    );

    // The same broadcaster feeds the WebSocket route, so events published
    // here reach connected clients.
    let events: Arc<dyn EventPublisher> = Arc::new(broadcaster.clone());
    let fee_policy = FeePolicy::default();
    let redirects = checkout_redirects(&config.public_base_url)?;

    Ok(HttpState {
        listings: Arc::new(ListingCatalogueService::new(
            listing_repo.clone(),
            events.clone(),
        )),
        offers: Arc::new(OfferNegotiationService::new(
            listing_repo.clone(),
            offer_repo.clone(),
            events.clone(),
        )),
        orders: Arc::new(OrderFulfilmentService::new(
            order_repo.clone(),
            events.clone(),
        )),
        settlement: Arc::new(SettlementService::new(
            listing_repo,
            offer_repo,
            order_repo.clone(),
            membership,
            gateway,
            events.clone(),
            fee_policy,
            redirects,
        )),
        reviews: Arc::new(ReviewLedgerService::new(review_repo, order_repo, events)),
        profiles: Arc::new(ProfileDirectoryService::new(profile_repo)),
        fee_policy,
    })
}

fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Run the server until shutdown.
///
/// # Errors
///
/// Returns an error when migrations, pool construction, gateway
/// construction or binding the listen address fail.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    run_migrations(&config.database_url)?;

    let broadcaster = ChangeBroadcaster::default();
    let http_state = web::Data::new(build_http_state(&config, &broadcaster).await?);
    let broadcaster = web::Data::new(broadcaster);
    let key = config.session_key.clone();
    let cookie_secure = config.cookie_secure;

    HttpServer::new(move || {
        App::new()
            .app_data(http_state.clone())
            .app_data(broadcaster.clone())
            .service(
                web::scope("/api/v1")
                    .wrap(session_middleware(key.clone(), cookie_secure))
                    .service(listings::create_listing)
                    .service(listings::browse_listings)
                    .service(listings::get_listing)
                    .service(listings::delete_listing)
                    .service(offers::create_offer)
                    .service(offers::list_offers)
                    .service(offers::respond_to_offer)
                    .service(offers::reply_to_counter)
                    .service(orders::list_orders)
                    .service(orders::get_order)
                    .service(orders::ship_order)
                    .service(orders::complete_order)
                    .service(orders::cancel_order)
                    .service(payments::create_checkout)
                    .service(payments::verify_payment)
                    .service(fees::estimate_fees)
                    .service(reviews::submit_review)
                    .service(reviews::list_order_reviews)
                    .service(reviews::get_rating_stats)
                    .service(profiles::get_user_profile)
                    .service(change_feed),
            )
            .route(
                "/api-docs/openapi.json",
                web::get().to(|| async { HttpResponse::Ok().json(ApiDoc::openapi()) }),
            )
    })
    .bind(config.bind_addr)?
    .run()
    .await
}
