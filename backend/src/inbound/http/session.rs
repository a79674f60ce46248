//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie is established by an external identity flow; this
//! service only reads the user id out of it. Handlers extract a
//! [`SessionContext`] and call [`SessionContext::require_user_id`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Seed a user id into the session cookie. Production sessions are
    /// written by the external identity flow, so only tests need this.
    #[cfg(test)]
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::inbound::http::test_utils::{
        login_as, seed_session_route, test_session_middleware,
    };

    /// Guarded route echoing the session's user id.
    fn whoami() -> actix_web::Resource {
        web::resource("/whoami").route(web::get().to(
            |session: SessionContext| async move {
                let id = session.require_user_id()?;
                Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
            },
        ))
    }

    #[actix_web::test]
    async fn seeded_cookie_authenticates_the_caller() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .service(seed_session_route())
                .service(whoami()),
        )
        .await;

        let user = UserId::random();
        let cookie = login_as(&app, &user).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test::read_body(response).await, user.to_string());
    }

    #[actix_web::test]
    async fn anonymous_requests_are_unauthorised() {
        let app = test::init_service(
            App::new().wrap(test_session_middleware()).service(whoami()),
        )
        .await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn a_cookie_with_a_garbled_user_id_stays_anonymous() {
        // The raw session write stands in for a corrupted or tampered cookie.
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .service(web::resource("/garble").route(web::post().to(
                    |session: Session| async move {
                        session
                            .insert(USER_ID_KEY, "definitely-not-a-uuid")
                            .map(|()| HttpResponse::Ok())
                    },
                )))
                .service(whoami()),
        )
        .await;

        let seeded = test::call_service(
            &app,
            test::TestRequest::post().uri("/garble").to_request(),
        )
        .await;
        let cookie = seeded
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
