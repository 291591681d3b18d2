// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Authentication and authorization failures are deliberately
/// indistinguishable to the caller: both redirect to the login page so a
/// probe cannot tell a missing identity from a wrong role.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient role")]
    Forbidden,

    #[error("Federated handshake failed: {0}")]
    Handshake(String),

    #[error("Prediction service unavailable")]
    UpstreamUnavailable,

    #[error("Status persistence failed: {0}")]
    Persistence(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // Page-flow failures: identical redirect, no information leak.
            AppError::Unauthenticated | AppError::Forbidden => {
                Redirect::to("/login").into_response()
            }
            AppError::Handshake(msg) => {
                tracing::warn!(error = %msg, "Federated handshake failed");
                Redirect::to("/login").into_response()
            }
            AppError::UpstreamUnavailable => {
                tracing::error!("Prediction service unavailable");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Prediction service unavailable",
                )
            }
            AppError::Persistence(msg) => {
                tracing::error!(error = %msg, "Status store write failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update bin status",
                )
            }
            AppError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    let body = ErrorResponse {
        error: message.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
