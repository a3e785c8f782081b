use actix_web::{get, web, HttpResponse, Responder};
use std::env;

use crate::{handlers::gallery::navigation_view, AppState};

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    let (slider, grid) = futures::join!(
        state.current_hero_frame(),
        state.gallery.list_outputs(None)
    );

    HttpResponse::Ok().json(serde_json::json!({
        "message": "DH 14th portfolio archive",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "navigation": navigation_view(),
        "slider": slider,
        "grid": grid,
    }))
}
