//! # Inkwell API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Inkwell API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(
        config.database.as_ref(),
        config.jwt.clone(),
        config.seed_user_email.as_deref(),
    )
    .await?;

    #[cfg(feature = "rate-limit")]
    let limiter = rate_limiter(&config)?;
    #[cfg(feature = "rate-limit")]
    let trust_proxy_headers = config.trust_proxy_headers;

    HttpServer::new(move || {
        let app = App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes);

        #[cfg(feature = "rate-limit")]
        let app = app.wrap(
            middleware::rate_limit::RateLimitMiddleware::new(limiter.clone())
                .trust_proxy_headers(trust_proxy_headers),
        );

        app.wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Build the limiter and prune idle client keys once per window.
#[cfg(feature = "rate-limit")]
fn rate_limiter(
    config: &AppConfig,
) -> std::io::Result<std::sync::Arc<dyn inkwell_core::ports::RateLimiter>> {
    use std::sync::Arc;

    use inkwell_infra::rate_limit::InMemoryRateLimiter;

    let limiter = Arc::new(
        InMemoryRateLimiter::new(config.rate_limit.clone()).map_err(std::io::Error::other)?,
    );

    let pruned = Arc::clone(&limiter);
    let every = config.rate_limit.window;
    actix_rt::spawn(async move {
        let mut ticker = actix_rt::time::interval(every);
        loop {
            ticker.tick().await;
            pruned.retain_recent();
        }
    });

    Ok(limiter)
}
