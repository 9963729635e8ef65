/// HTTP handlers for the upload service
///
/// This module contains handlers for:
/// - Uploads: multipart video intake and fan-out
/// - Videos: catalog listing proxy
/// - Health: liveness independent of downstream services
pub mod uploads;
pub mod videos;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{web, HttpResponse};

use crate::config::CorsConfig;

pub use uploads::upload_video;
pub use videos::list_videos;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("Not Found")
}

/// Build the CORS middleware from the configured origins.
///
/// `*` allows any origin; credentials are only allowed for explicit origins.
pub fn build_cors(cfg: &CorsConfig) -> Cors {
    let mut cors = Cors::default();
    let mut explicit = false;

    for origin in &cfg.allowed_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
            explicit = true;
        }
    }

    cors = cors
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600);

    if explicit {
        cors = cors.supports_credentials();
    }
    cors
}

/// Register all routes.
///
/// Expects `web::Data<Config>`, `web::Data<IngestPipeline>` and
/// `web::Data<dyn VideoCatalog>` to be registered on the app.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::post().to(upload_video))
        .route("/upload", web::post().to(upload_video))
        .route("/health", web::get().to(health))
        .route("/videos", web::get().to(list_videos))
        .default_service(web::to(not_found));
}
