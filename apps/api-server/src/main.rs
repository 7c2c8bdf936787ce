//! # Tally API Server
//!
//! Relays posts to the upstream social API while enforcing the account's
//! per-minute, hourly, daily and monthly posting quotas.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::rate_limit::RateLimitMiddleware;
use middleware::security::{cors, security_headers};
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        host = %config.host,
        port = config.port,
        tier = %config.tier.as_str(),
        environment = %config.environment,
        "Starting Tally API Server"
    );

    let state = AppState::new(&config);

    #[cfg(feature = "scheduler")]
    let mut scheduler = match background::start_maintenance(
        state.clone(),
        &config.sweep_cron,
        config.scheduler_enabled,
    )
    .await
    {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start maintenance scheduler");
            None
        }
    };

    let json_limit = config.json_body_limit;
    let trust_proxy = config.trust_proxy;

    HttpServer::new(move || {
        App::new()
            .wrap(RateLimitMiddleware::new(state.rate_limiter()).trust_proxy(trust_proxy))
            .wrap(security_headers())
            .wrap(cors())
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(handlers::json_config(json_limit))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
