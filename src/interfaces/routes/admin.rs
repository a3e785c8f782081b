use actix_web::web;

use crate::{
    admin_workspace::DeskEntity,
    entities::{output::Output, slider::SliderItem},
    handlers::{admin, auth, system::admin_health_check},
};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(auth::admin_index)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::current_session)
            .service(admin_health_check)
            .service(controller_scope::<Output>("/outputs"))
            .service(controller_scope::<SliderItem>("/sliders"))
    );
}

/// List/form endpoints of one admin table.
fn controller_scope<E: DeskEntity>(path: &str) -> actix_web::Scope {
    web::scope(path)
        .service(
            web::resource("")
                .route(web::get().to(admin::load::<E>))
        )
        .service(
            web::resource("/state")
                .route(web::get().to(admin::snapshot::<E>))
        )
        .service(
            web::resource("/draft")
                .route(web::post().to(admin::start_create::<E>))
                .route(web::patch().to(admin::update_draft::<E>))
                .route(web::delete().to(admin::cancel::<E>))
        )
        .service(
            web::resource("/draft/image")
                .route(web::post().to(admin::upload_image::<E>))
        )
        .service(
            web::resource("/draft/submit")
                .route(web::post().to(admin::submit::<E>))
        )
        .service(
            web::resource("/{id:\\d+}/edit")
                .route(web::post().to(admin::start_edit::<E>))
        )
        .service(
            web::resource("/{id:\\d+}")
                .route(web::delete().to(admin::delete::<E>))
        )
}
