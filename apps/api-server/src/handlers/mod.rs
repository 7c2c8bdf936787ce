//! HTTP handlers and route configuration.

mod health;
mod posts;


use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .route("/tweet", web::post().to(posts::create_post))
                .route("/rate-limit-status", web::get().to(posts::rate_limit_status))
                .route("/account", web::get().to(posts::account)),
        )
        .default_service(web::to(not_found));
}

/// JSON body extractor settings: size cap and problem-details errors.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| AppError::invalid_request(err.to_string()).into())
}

async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!(
        "Route {} {} not found",
        req.method(),
        req.path()
    )))
}
