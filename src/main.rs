mod api;
mod config;
mod database;
mod middleware;
mod models;
mod repository;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    database::{ConnectionCache, MongoConnector},
    middleware::{RequireRegistration, SecurityHeaders, SessionGate},
    repository::MongoUserRepository,
    services::image_host::CloudinaryImageHost,
    state::AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Missing configuration is fatal at startup
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    log::info!("🚀 Starting User Registry...");
    log::info!("📊 Database: {}", config.mongodb_database);
    log::info!("🔒 Secure cookies: {}", config.production);

    // One cache per process, shared by every worker. The first query connects.
    let cache = Arc::new(ConnectionCache::new(MongoConnector::new(
        config.mongodb_uri.clone(),
        config.mongodb_database.clone(),
    )));

    let images = CloudinaryImageHost::new(config.cloudinary.clone())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let state = web::Data::new(AppState::new(
        Arc::new(MongoUserRepository::new(Arc::clone(&cache))),
        Arc::new(images),
        SessionGate::new(config.production),
        config.cloudinary.folder.clone(),
    ));
    let cache_data = web::Data::from(Arc::clone(&cache));

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    let cors_origin = config.cors_origin.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .app_data(cache_data.clone())
            .wrap(RequireRegistration::new("/dashboard", "/"))
            .wrap(cors)
            .wrap(SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
