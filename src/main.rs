use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use dh14th_archive::{
    admin_workspace::watch_sign_outs,
    background_task::{start_hero_slider, start_purge_task},
    graceful_shutdown::shutdown_signal,
    middlewares::auth::AuthMiddleware,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tokio::sync::oneshot;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let production = std::env::var("APP_ENV").is_ok_and(|env| env.eq_ignore_ascii_case("production"));

    if production {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
    };

    cors.allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(&config));

    let server_addr = format!("{}:{}", config.host, config.port);
    let cors_origins = config.cors_origins();

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    tokio::spawn(watch_sign_outs(
        Arc::clone(&app_state.workspace),
        app_state.auth_handler.subscribe(),
    ));
    tokio::spawn(start_purge_task(Arc::clone(&app_state.auth_handler)));

    let (stop_slider, slider_stopped) = oneshot::channel();
    let slider = tokio::spawn(start_hero_slider(
        Arc::clone(&app_state.gallery),
        app_state.hero_frame_sender(),
        slider_stopped,
    ));

    let state = app_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(AuthMiddleware)
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .wrap(build_cors(&cors_origins))
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    let result = tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    };

    let _ = stop_slider.send(());
    if let Err(e) = slider.await {
        tracing::error!("Hero slider task failed: {}", e);
    }

    result
}
