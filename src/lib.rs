// SPDX-License-Identifier: MIT

//! Binwatch: waste-bin monitoring dashboard backend.
//!
//! Fronts the dashboard with dual-mode authentication (Google federated
//! identity and locally issued signed credentials), role-gated pages, and a
//! status aggregation layer merging external fill-level predictions with
//! locally persisted collected/scheduled overrides.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{AccountStore, SessionStore, StatusStore};
use services::{GoogleOAuthClient, PredictionClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub accounts: AccountStore,
    pub sessions: SessionStore,
    pub status: StatusStore,
    pub predictor: PredictionClient,
    pub google_oauth: GoogleOAuthClient,
}
