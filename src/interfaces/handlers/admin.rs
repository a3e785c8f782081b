use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    admin_workspace::DeskEntity,
    entities::upload::UploadReceipt,
    errors::AppError,
    use_cases::{admin::Confirmation, extractors::AdminSession},
    utils::uploads::{ensure_image, read_upload},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ImageFieldQuery<F> {
    pub field: F,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, MultipartForm)]
pub struct ImageUploadForm {
    pub file: TempFile,
}

/// Re-reads the table and returns the list screen.
pub async fn load<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let mut controller = E::controller(&desk).lock().await;
    controller.load().await;
    Ok(HttpResponse::Ok().json(controller.snapshot()))
}

pub async fn snapshot<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let controller = E::controller(&desk).lock().await;
    Ok(HttpResponse::Ok().json(controller.snapshot()))
}

pub async fn start_create<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let draft = E::controller(&desk).lock().await.start_create();
    Ok(HttpResponse::Ok().json(draft))
}

pub async fn start_edit<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let draft = E::controller(&desk).lock().await.start_edit_by_id(path.into_inner())?;
    Ok(HttpResponse::Ok().json(draft))
}

pub async fn update_draft<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
    patch: web::Json<E::Patch>,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let draft = E::controller(&desk).lock().await.update_draft(patch.into_inner())?;
    Ok(HttpResponse::Ok().json(draft))
}

/// The transfer runs with the controller unlocked so uploads to different
/// image fields of the same draft can overlap.
pub async fn upload_image<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
    query: web::Query<ImageFieldQuery<E::ImageField>>,
    MultipartForm(form): MultipartForm<ImageUploadForm>,
) -> Result<HttpResponse, AppError> {
    let file = read_upload(form.file, state.max_upload_bytes).await?;
    ensure_image(&file)?;

    let desk = state.workspace.desk(&session.0);
    let controller = E::controller(&desk);

    let pending = controller.lock().await.begin_upload(query.field, file)?;
    let path = pending.path().to_string();
    let finished = pending.store().await;
    let public_url = controller.lock().await.finish_upload(finished)?;

    Ok(HttpResponse::Ok().json(UploadReceipt { path, public_url }))
}

pub async fn submit<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let mut controller = E::controller(&desk).lock().await;
    let outcome = controller.submit().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "outcome": outcome,
        "state": controller.snapshot(),
    })))
}

pub async fn cancel<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let mut controller = E::controller(&desk).lock().await;
    controller.cancel();
    Ok(HttpResponse::Ok().json(controller.snapshot()))
}

pub async fn delete<E: DeskEntity>(
    state: web::Data<AppState>,
    session: AdminSession,
    path: web::Path<i64>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, AppError> {
    let desk = state.workspace.desk(&session.0);
    let mut controller = E::controller(&desk).lock().await;
    let outcome = controller
        .delete(path.into_inner(), Confirmation::from(query.confirm))
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "outcome": outcome,
        "state": controller.snapshot(),
    })))
}
