//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{HttpResponse, Resource, web};

use crate::domain::listing_service::MockListingCatalogue;
use crate::domain::offer_service::MockOfferNegotiation;
use crate::domain::order_service::MockOrderFulfilment;
use crate::domain::profile_service::MockProfileDirectory;
use crate::domain::review_service::MockReviewLedger;
use crate::domain::settlement::MockSettlement;
use crate::domain::{Error, FeePolicy, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocked driving ports for handler tests. Tests set expectations on the
/// ports they exercise and leave the rest untouched.
#[derive(Default)]
pub struct TestPorts {
    pub listings: MockListingCatalogue,
    pub offers: MockOfferNegotiation,
    pub orders: MockOrderFulfilment,
    pub settlement: MockSettlement,
    pub reviews: MockReviewLedger,
    pub profiles: MockProfileDirectory,
}

impl TestPorts {
    /// Freeze the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState {
            listings: Arc::new(self.listings),
            offers: Arc::new(self.offers),
            orders: Arc::new(self.orders),
            settlement: Arc::new(self.settlement),
            reviews: Arc::new(self.reviews),
            profiles: Arc::new(self.profiles),
            fee_policy: FeePolicy::default(),
        }
    }
}

/// Route that seeds the session cookie with a user id, standing in for the
/// external identity flow during handler tests.
pub fn seed_session_route() -> Resource {
    web::resource("/test-login/{user_id}").route(web::post().to(
        |session: SessionContext, path: web::Path<uuid::Uuid>| async move {
            let id = UserId::from_uuid(path.into_inner());
            session.persist_user(&id)?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        },
    ))
}

/// Obtain a session cookie authenticating as `user_id`.
///
/// The app under test must have registered [`seed_session_route`].
pub async fn login_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    user_id: &UserId,
) -> Cookie<'static> {
    let request = actix_web::test::TestRequest::post()
        .uri(&format!("/test-login/{user_id}"))
        .to_request();
    let response = actix_web::test::call_service(app, request).await;
    assert!(response.status().is_success());
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
