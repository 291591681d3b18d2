// SPDX-License-Identifier: MIT

//! Binwatch API Server
//!
//! Serves the waste-bin monitoring dashboard: dual-mode authentication,
//! role-gated pages, and aggregation of external fill-level predictions
//! with locally persisted overrides.

use binwatch::{
    config::Config,
    db::{AccountStore, SessionStore, StatusStore},
    services::{GoogleOAuthClient, PredictionClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Binwatch API");

    // Load persisted bin status overrides
    let status = StatusStore::load(config.status_file.clone())
        .await
        .expect("Failed to load bin status store");

    // Seed the demo account set
    let accounts = AccountStore::seeded_demo().expect("Failed to seed accounts");

    let sessions = SessionStore::new();

    let predictor = PredictionClient::new(config.prediction_url.clone());
    tracing::info!(endpoint = %config.prediction_url, "Prediction client initialized");

    let google_oauth = GoogleOAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        accounts,
        sessions,
        status,
        predictor,
        google_oauth,
    });

    // Build router
    let app = binwatch::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("binwatch=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
