use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    get, http::header, post, web, HttpResponse, Responder,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    constants::{ADMIN_HOME_ROUTE, LOGIN_ROUTE},
    entities::session::{LoginRequest, SessionResponse, SessionUser},
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
    pub redirect: String,
}

fn session_cookie(state: &AppState, token: String, expires_at: DateTime<Utc>) -> Cookie<'static> {
    let max_age = (expires_at - Utc::now()).num_seconds().max(0);
    Cookie::build(state.session_cookie.clone(), token)
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age))
        .finish()
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state.auth_handler.sign_in(&request).await?;
    let cookie = session_cookie(&state, session.access_token.clone(), session.expires_at);

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        access_token: session.access_token.clone(),
        token_type: "Bearer".to_string(),
        expires_at: session.expires_at,
        user: session.user.clone(),
        redirect: ADMIN_HOME_ROUTE.to_string(),
    }))
}

#[post("/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    session: AdminSession,
) -> impl Responder {
    state.auth_handler.sign_out(&session.0.access_token).await;

    let mut removal = Cookie::new(state.session_cookie.clone(), "");
    removal.set_path("/");
    removal.make_removal();

    HttpResponse::Ok().cookie(removal).json(serde_json::json!({
        "message": "Signed out",
        "redirect": LOGIN_ROUTE
    }))
}

#[get("/session")]
pub async fn current_session(session: AdminSession) -> impl Responder {
    let session = session.0;
    HttpResponse::Ok().json(SessionResponse {
        user: session.user.clone(),
        expires_at: session.expires_at,
        redirect: ADMIN_HOME_ROUTE.to_string(),
    })
}

#[get("")]
pub async fn admin_index(_session: AdminSession) -> impl Responder {
    HttpResponse::Found()
        .insert_header((header::LOCATION, ADMIN_HOME_ROUTE))
        .finish()
}
