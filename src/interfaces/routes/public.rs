use actix_web::web;

use crate::handlers::gallery;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(gallery::list_outputs)
        .service(gallery::get_work)
        .service(gallery::hero_slider)
        .service(gallery::navigation)
        .service(gallery::submit_work);
}
