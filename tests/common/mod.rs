// SPDX-License-Identifier: MIT

//! Shared test helpers.

use axum::http::header;
use axum::response::Response;
use binwatch::config::Config;
use binwatch::db::{AccountStore, SessionStore, StatusStore};
use binwatch::models::Role;
use binwatch::routes::create_router;
use binwatch::services::{GoogleOAuthClient, PredictionClient};
use binwatch::AppState;
use std::sync::Arc;

/// App handle for tests: the router, the shared state, and the tempdir
/// backing the status store (dropped with the handle).
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    #[allow(dead_code)]
    pub dir: tempfile::TempDir,
}

/// Build a test app with seeded demo-style accounts (low bcrypt cost for
/// speed) and a status store in a temp directory. The prediction endpoint
/// points at an unused port so upstream calls fail unless overridden.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_prediction_url("http://127.0.0.1:9/predict").await
}

pub async fn create_test_app_with_prediction_url(prediction_url: &str) -> TestApp {
    build_test_app(prediction_url, None).await
}

/// Variant with a fast heartbeat so event-stream tests don't wait out the
/// production interval.
#[allow(dead_code)]
pub async fn create_test_app_with_heartbeat_secs(heartbeat_secs: u64) -> TestApp {
    build_test_app("http://127.0.0.1:9/predict", Some(heartbeat_secs)).await
}

async fn build_test_app(prediction_url: &str, heartbeat_secs: Option<u64>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config {
        prediction_url: prediction_url.to_string(),
        status_file: dir.path().join("bin_status.json"),
        ..Config::default()
    };
    if let Some(secs) = heartbeat_secs {
        config.heartbeat_secs = secs;
    }

    let mut accounts = AccountStore::new();
    let hash = bcrypt::hash("123", 4).unwrap();
    accounts.insert_hashed("admin", &hash, Role::Admin).unwrap();
    accounts.insert_hashed("worker1", &hash, Role::Worker).unwrap();

    let status = StatusStore::load(config.status_file.clone()).await.unwrap();
    let predictor = PredictionClient::new(config.prediction_url.clone());
    let google_oauth = GoogleOAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );

    let state = Arc::new(AppState {
        config,
        accounts,
        sessions: SessionStore::new(),
        status,
        predictor,
        google_oauth,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        dir,
    }
}

/// All Set-Cookie header values on a response.
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Extract the `name=value` pair for a cookie set on the response.
pub fn extract_cookie(response: &Response, name: &str) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .map(|value| value.split(';').next().unwrap().to_string())
}
