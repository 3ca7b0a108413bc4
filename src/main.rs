use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod core;
mod db;
mod docs;
mod model;
mod routes;
mod store;

use config::Config;
use db::init_db;

use crate::core::validator::AttendanceValidator;
use crate::docs::ApiDoc;
use crate::store::attendance::MySqlAttendanceStore;
use crate::store::office::MySqlOfficeRegistry;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let registry = Data::new(MySqlOfficeRegistry::new(
        pool.clone(),
        Duration::from_secs(config.geofence_cache_ttl_secs),
    ));
    let validator = Data::new(AttendanceValidator::new(
        registry.clone().into_inner(),
        Arc::new(MySqlAttendanceStore::new(pool.clone())),
    ));

    let registry_for_warmup = registry.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = registry_for_warmup.warmup().await {
            eprintln!("Failed to warmup geofence cache: {:?}", e);
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} to match JS/CSS files
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(registry.clone())
            .app_data(validator.clone())
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
