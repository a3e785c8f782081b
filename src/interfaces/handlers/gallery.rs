use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{MEMBERS, NAV_ITEMS},
    dropdown::member_route,
    entities::upload::WorkSubmission,
    errors::AppError,
    utils::uploads::read_upload,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct OutputQuery {
    pub author: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct NavigationView {
    pub items: Vec<NavLink>,
    pub members: Vec<NavLink>,
}

pub fn navigation_view() -> NavigationView {
    NavigationView {
        items: NAV_ITEMS
            .iter()
            .map(|&(label, href)| NavLink { label, href: href.to_string() })
            .collect(),
        members: MEMBERS
            .iter()
            .map(|&member| NavLink { label: member, href: member_route(member) })
            .collect(),
    }
}

#[get("/output")]
pub async fn list_outputs(
    state: web::Data<AppState>,
    query: web::Query<OutputQuery>,
) -> impl Responder {
    let grid = state.gallery.list_outputs(query.author.as_deref()).await;
    HttpResponse::Ok().json(grid)
}

#[get("/work/{id}")]
pub async fn get_work(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let detail = state.gallery.get_work(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/slider")]
pub async fn hero_slider(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.current_hero_frame().await)
}

#[get("/nav")]
pub async fn navigation() -> impl Responder {
    HttpResponse::Ok().json(navigation_view())
}

#[derive(Debug, MultipartForm)]
pub struct SubmissionForm {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub file: Option<TempFile>,
}

#[post("/submit")]
pub async fn submit_work(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<SubmissionForm>,
) -> Result<HttpResponse, AppError> {
    let file = match form.file {
        Some(temp) => Some(read_upload(temp, state.max_upload_bytes).await?),
        None => None,
    };

    let submission = WorkSubmission {
        title: form.title.map(|t| t.into_inner()).unwrap_or_default(),
        description: form.description.map(|d| d.into_inner()).filter(|d| !d.trim().is_empty()),
        file,
    };

    let receipt = state.submissions.submit_work(submission).await?;
    Ok(HttpResponse::Created().json(receipt))
}
