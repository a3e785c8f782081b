use actix_web::{FromRequest, HttpRequest, HttpMessage};
use futures_util::future::{ready, Ready};

use crate::{entities::session::Session, errors::AppError};

/// Extractor for the signed-in admin session placed in the request by the auth middleware.
/// Returns 401 with the login route when there is none.
/// Usage: Add `session: AdminSession` as a parameter to your handler function.
#[derive(Debug)]
pub struct AdminSession(pub Session);

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Session>() {
            Some(session) => ready(Ok(AdminSession(session.clone()))),
            None => ready(Err(AppError::UnauthorizedAccess.into())),
        }
    }
}
