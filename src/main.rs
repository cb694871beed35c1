mod accounts;
mod api;
mod auth;
mod config;
mod engine;
mod error;
mod geo;
mod models;
mod observability;
mod state;
mod store;
mod validate;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::auth::TokenManager;
use crate::geo::NominatimLookup;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let distance = NominatimLookup::new(
        config.geocoder_url.clone(),
        Duration::from_secs(config.geocoder_timeout_secs),
    )
    .map_err(|err| error::AppError::Internal(format!("failed to build geocoder client: {err}")))?;

    let tokens = TokenManager::new(&config.token_secret, config.token_ttl_secs);
    let shared_state = Arc::new(state::AppState::new(
        Arc::new(distance),
        tokens,
        config.empty_query_is_error,
    ));

    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
