use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{constants::LOGIN_ROUTE, errors::AppError, AppState};

/// Requires an admin session on every `/admin` route except the login route.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public_route(req.path(), req.method().as_str()) {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in middleware");
                let response = AppError::InternalError("Application state unavailable".into()).error_response();
                return Ok(req.into_response(response));
            };

            let Some(token) = extract_token(&req, &state.session_cookie) else {
                tracing::warn!("Admin route {} requested without a session", req.path());
                return Ok(unauthorized(req));
            };

            let Some(session) = state.auth_handler.get_session(&token).await else {
                tracing::warn!("Admin route {} requested with an unknown or expired session", req.path());
                return Ok(unauthorized(req));
            };

            req.extensions_mut().insert(session);
            service.call(req).await
        })
    }
}

fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    let is_admin = path == "/admin" || path.starts_with("/admin/");
    !is_admin || path == LOGIN_ROUTE
}

/// Session token from the admin cookie, else from an `Authorization: Bearer` header.
fn extract_token(req: &ServiceRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn unauthorized(req: ServiceRequest) -> ServiceResponse<BoxBody> {
    req.into_response(AppError::UnauthorizedAccess.error_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_pages_and_login_skip_the_gate() {
        assert!(is_public_route("/", "GET"));
        assert!(is_public_route("/output", "GET"));
        assert!(is_public_route("/work/3", "GET"));
        assert!(is_public_route("/administrator", "GET"));
        assert!(is_public_route(LOGIN_ROUTE, "POST"));
        assert!(is_public_route("/admin/outputs", "OPTIONS"));
    }

    #[test]
    fn admin_area_is_gated() {
        assert!(!is_public_route("/admin", "GET"));
        assert!(!is_public_route("/admin/outputs", "GET"));
        assert!(!is_public_route("/admin/sliders/draft", "POST"));
        assert!(!is_public_route("/admin/logout", "POST"));
    }
}
