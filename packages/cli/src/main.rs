// ABOUTME: Bountyboard server entrypoint
// ABOUTME: Wires config, database, settlement, notifications, and the HTTP API

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use bountyboard_api::{ApiSettings, DbState};
use bountyboard_notify::{DebounceScheduler, LogSender};
use bountyboard_payments::StripeProcessor;
use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting Bountyboard server on port {}", config.port);

    let pool = bountyboard_storage::connect(&config.database_path).await?;

    let processor = Arc::new(StripeProcessor::new(config.stripe_secret_key.clone()));
    let scheduler = Arc::new(DebounceScheduler::new(config.notification_debounce_minutes));

    // Digest sweep runs for the life of the process.
    tokio::spawn(scheduler.clone().run(Arc::new(LogSender)));

    let state = DbState::new(
        pool,
        processor,
        scheduler,
        config.confirmation_percentage,
        ApiSettings {
            similar_threshold: config.similar_request_threshold,
            similar_max_results: config.similar_request_max_results,
        },
    );

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<axum::http::HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = bountyboard_api::create_router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
