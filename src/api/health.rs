use actix_web::{web, HttpResponse};
use crate::database::MongoCache;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// "connected" once the cached database handle is live, "idle" before the
    /// first query (the connection is opened lazily).
    pub database: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(cache: Option<web::Data<MongoCache>>) -> HttpResponse {
    let database = match cache {
        Some(cache) if cache.is_connected() => "connected",
        Some(_) => "idle",
        None => "unconfigured",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
