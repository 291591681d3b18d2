// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod credential;
pub mod google_oauth;
pub mod predictor;

pub use credential::{issue_credential, verify_credential, VerificationError};
pub use google_oauth::GoogleOAuthClient;
pub use predictor::PredictionClient;
